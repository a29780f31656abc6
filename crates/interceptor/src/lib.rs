//! Session-aware request pipeline
//!
//! Wraps an HTTP client in an explicit, ordered pipeline of interceptors:
//!
//! 1. Request interceptors decorate each `PendingRequest` before dispatch
//!    (`BearerAuth` attaches the stored user or admin token)
//! 2. `SessionClient` dispatches through reqwest and turns non-2xx responses
//!    and transport errors into a `RequestFailure`
//! 3. Response interceptors observe the failure (`SessionInvalidator` clears
//!    the rejected credential on a 401 and redirects guarded views to login)
//! 4. The failure is returned to the caller unchanged
//!
//! Interceptor side effects are best-effort; they never swallow a failure.

pub mod bearer;
pub mod client;
pub mod endpoints;
pub mod failure;
pub mod invalidate;
pub mod metrics;
pub mod pipeline;
pub mod request;

pub use bearer::{BearerAuth, SelectionPolicy};
pub use client::{ApiResponse, SessionClient};
pub use failure::{FailureClass, RequestFailure, Result, classify_status};
pub use invalidate::SessionInvalidator;
pub use pipeline::{BoxFuture, Pipeline, RequestInterceptor, ResponseInterceptor};
pub use request::{PendingRequest, RequestScope};
