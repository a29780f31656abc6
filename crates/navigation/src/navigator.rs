//! Navigator: guarded navigation over the route table
//!
//! Runs the guard once per navigation attempt and commits the resulting
//! route. A redirect is itself checked by the same guard; login routes are
//! unguarded (enforced by `RouteTable::new`), so a redirect always commits.
//!
//! The current route lives in a `watch` channel: callers read it with
//! `current()`, observers `subscribe()` to see redirects as they happen.

use std::sync::Arc;

use session_store::{CredentialKind, CredentialStore};
use tokio::sync::watch;
use tracing::{debug, info, instrument};

use crate::error::{Error, Result};
use crate::guard::{self, NavigationDecision};
use crate::location::Location;
use crate::route::{AccessRequirement, REDIRECT_PARAM, RouteTable};

/// Default landing views after a login with no pending destination.
const USER_HOME: &str = "/chat";
const ADMIN_HOME: &str = "/admin/dashboard";

/// The committed route and the requirement it was entered under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentRoute {
    pub location: Location,
    pub requirement: AccessRequirement,
}

/// Result of a navigation attempt.
///
/// `decision` is the guard verdict for the requested target; `route` is what
/// was actually committed (the login view when redirected).
#[derive(Debug, Clone)]
pub struct NavigationOutcome {
    pub decision: NavigationDecision,
    pub route: CurrentRoute,
}

pub struct Navigator {
    routes: RouteTable,
    store: Arc<CredentialStore>,
    current: watch::Sender<Option<CurrentRoute>>,
}

impl Navigator {
    pub fn new(routes: RouteTable, store: Arc<CredentialStore>) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            routes,
            store,
            current,
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Currently committed route, `None` before the first navigation.
    pub fn current(&self) -> Option<CurrentRoute> {
        self.current.borrow().clone()
    }

    /// Requirement of the current route; `None` before the first navigation.
    pub fn current_requirement(&self) -> AccessRequirement {
        self.current
            .borrow()
            .as_ref()
            .map(|route| route.requirement)
            .unwrap_or_default()
    }

    /// Receive every committed route.
    pub fn subscribe(&self) -> watch::Receiver<Option<CurrentRoute>> {
        self.current.subscribe()
    }

    /// Attempt a navigation to `target`.
    #[instrument(skip(self))]
    pub async fn navigate(&self, target: &str) -> Result<NavigationOutcome> {
        let location = Location::parse(target)?;
        let requirement = self.routes.requirement_for(location.path());
        let presence = self.store.presence().await;
        let decision = guard::evaluate(requirement, presence, location.full_path());

        let route = match decision.login_target() {
            None => {
                debug!(path = location.path(), %requirement, "navigation allowed");
                CurrentRoute {
                    location,
                    requirement,
                }
            }
            Some(login) => {
                let login_requirement = self.routes.requirement_for(login.path());
                let recheck = guard::evaluate(login_requirement, presence, login.full_path());
                if recheck.is_redirect() {
                    return Err(Error::RedirectLoop(login.path().to_string()));
                }
                crate::metrics::record_redirect(login.path());
                info!(
                    from = location.full_path(),
                    to = login.full_path(),
                    %requirement,
                    "navigation redirected to login"
                );
                CurrentRoute {
                    location: login,
                    requirement: login_requirement,
                }
            }
        };

        self.current.send_replace(Some(route.clone()));
        Ok(NavigationOutcome { decision, route })
    }

    /// Send the view to the login page for `kind`, keeping `resume` as the
    /// destination to return to.
    pub async fn redirect_to_login(
        &self,
        kind: CredentialKind,
        resume: Option<&str>,
    ) -> Result<NavigationOutcome> {
        let target = guard::login_location(kind, resume);
        self.navigate(target.full_path()).await
    }

    /// After a successful login, continue to the destination saved in the
    /// current login view's `redirect` parameter, or to the default landing
    /// view for `kind`.
    pub async fn resume_after_login(&self, kind: CredentialKind) -> Result<NavigationOutcome> {
        let login_path = guard::login_path(kind);
        let pending = self.current().and_then(|route| {
            if route.location.path() != login_path {
                return None;
            }
            route
                .location
                .query_param(REDIRECT_PARAM)
                .filter(|target| target.starts_with('/') && !target.starts_with("//"))
                .map(str::to_string)
        });

        let target = pending.unwrap_or_else(|| match kind {
            CredentialKind::User => USER_HOME.to_string(),
            CredentialKind::Admin => ADMIN_HOME.to_string(),
        });
        self.navigate(&target).await
    }
}
