//! Role-scoped navigation guarding
//!
//! Every view declares one `AccessRequirement`. Before a navigation is
//! committed the `Navigator` checks that requirement against the credential
//! store and either lets the intent through or replaces it with the matching
//! login view, carrying the original destination in the `redirect` query
//! parameter so the login flow can resume it.
//!
//! Navigation flow:
//! 1. `Navigator::navigate("/admin/dashboard")` parses the target
//! 2. `RouteTable::requirement_for` resolves the matched route chain
//! 3. `guard::evaluate` decides Allowed / RedirectToUserLogin / RedirectToAdminLogin
//! 4. The committed route is published on a watch channel for observers

pub mod error;
pub mod guard;
pub mod location;
pub mod metrics;
pub mod navigator;
pub mod route;

pub use error::{Error, Result};
pub use guard::{NavigationDecision, evaluate, login_location, login_path};
pub use location::Location;
pub use navigator::{CurrentRoute, NavigationOutcome, Navigator};
pub use route::{
    ADMIN_LOGIN_PATH, AccessRequirement, LOGIN_PATH, REDIRECT_PARAM, RouteDescriptor, RouteSpec,
    RouteTable,
};
