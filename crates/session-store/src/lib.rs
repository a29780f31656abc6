//! Credential storage for the session console
//!
//! Holds at most two bearer credentials, one for the user session and one for
//! the admin session, under the storage keys the web front-end used. The store
//! is the single source of truth read by the request interceptors and the
//! navigation guard; it knows nothing about routes or requests.
//!
//! Lifecycle:
//! 1. A login flow calls `CredentialStore::set(kind, token)`
//! 2. Every outgoing request and navigation check calls `get` / `presence`
//! 3. Explicit logout or a 401 on the matching scope calls `clear(kind)`

pub mod credentials;
pub mod error;
pub mod keys;

pub use credentials::{Credential, CredentialKind, CredentialStore, Presence};
pub use error::{Error, Result};
