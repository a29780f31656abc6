//! Session invalidation on authorization failure
//!
//! On a 401 the request is classified by URL (`/admin/` → admin scope,
//! otherwise user scope) and that scope's credential is cleared. If the view
//! currently shown requires exactly that credential, the navigator is sent to
//! the matching login view with the current location as the resumption
//! target. Failures on unrelated views (background requests) clear the
//! credential but leave navigation alone.

use std::sync::Arc;

use navigation::Navigator;
use session_store::CredentialStore;
use tracing::{debug, info, warn};

use crate::failure::RequestFailure;
use crate::metrics::record_auth_failure;
use crate::pipeline::{BoxFuture, ResponseInterceptor};
use crate::request::{PendingRequest, RequestScope};

pub struct SessionInvalidator {
    store: Arc<CredentialStore>,
    navigator: Arc<Navigator>,
}

impl SessionInvalidator {
    pub fn new(store: Arc<CredentialStore>, navigator: Arc<Navigator>) -> Self {
        Self { store, navigator }
    }

    async fn invalidate(&self, request: &PendingRequest) {
        let scope = RequestScope::of_url(&request.url);
        let kind = scope.credential();
        record_auth_failure(scope);

        match self.store.clear(kind).await {
            Ok(removed) => info!(
                request_id = %request.request_id,
                url = %request.url,
                %scope,
                removed,
                "authorization failed, credential cleared"
            ),
            Err(e) => warn!(
                request_id = %request.request_id,
                %scope,
                error = %e,
                "authorization failed, clearing credential failed"
            ),
        }

        let Some(current) = self.navigator.current() else {
            debug!(%scope, "no active view, skipping redirect");
            return;
        };
        if current.requirement != scope.requirement() {
            debug!(
                %scope,
                view = current.location.path(),
                view_requirement = %current.requirement,
                "active view does not depend on this credential, skipping redirect"
            );
            return;
        }

        let resume = current.location.full_path().to_string();
        if let Err(e) = self.navigator.redirect_to_login(kind, Some(&resume)).await {
            warn!(%scope, error = %e, "login redirect after authorization failure failed");
        }
    }
}

impl ResponseInterceptor for SessionInvalidator {
    fn id(&self) -> &str {
        "session-invalidator"
    }

    fn on_failure<'a>(
        &'a self,
        request: &'a PendingRequest,
        failure: &'a RequestFailure,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            if failure.is_authorization() {
                self.invalidate(request).await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navigation::{AccessRequirement, RouteDescriptor, RouteTable};
    use session_store::{CredentialKind, Presence};

    struct Fixture {
        store: Arc<CredentialStore>,
        navigator: Arc<Navigator>,
        invalidator: SessionInvalidator,
    }

    fn fixture(routes: RouteTable) -> Fixture {
        let store = Arc::new(CredentialStore::in_memory());
        let navigator = Arc::new(Navigator::new(routes, store.clone()));
        let invalidator = SessionInvalidator::new(store.clone(), navigator.clone());
        Fixture {
            store,
            navigator,
            invalidator,
        }
    }

    async fn both_logged_in(store: &CredentialStore) {
        store.set(CredentialKind::User, "u").await.unwrap();
        store.set(CredentialKind::Admin, "a").await.unwrap();
    }

    fn unauthorized(url: &str) -> (PendingRequest, RequestFailure) {
        (
            PendingRequest::get(url),
            RequestFailure::from_status(401, url, ""),
        )
    }

    fn guarded_chat_routes() -> RouteTable {
        RouteTable::new(vec![
            RouteDescriptor::new("/login", "login", AccessRequirement::None),
            RouteDescriptor::new("/chat", "chat", AccessRequirement::RequiresUser),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn admin_401_clears_only_admin() {
        let f = fixture(RouteTable::default());
        both_logged_in(&f.store).await;

        let (request, failure) = unauthorized("/admin/dashboard/");
        f.invalidator.on_failure(&request, &failure).await;

        assert_eq!(
            f.store.presence().await,
            Presence {
                user: true,
                admin: false
            }
        );
    }

    #[tokio::test]
    async fn user_401_clears_only_user() {
        let f = fixture(RouteTable::default());
        both_logged_in(&f.store).await;

        let (request, failure) = unauthorized("/chat/send");
        f.invalidator.on_failure(&request, &failure).await;

        assert_eq!(
            f.store.presence().await,
            Presence {
                user: false,
                admin: true
            }
        );
    }

    #[tokio::test]
    async fn other_failures_have_no_side_effects() {
        let f = fixture(RouteTable::default());
        both_logged_in(&f.store).await;
        f.navigator.navigate("/admin/dashboard").await.unwrap();

        let request = PendingRequest::get("/admin/dashboard/");
        for failure in [
            RequestFailure::from_status(403, "/admin/dashboard/", ""),
            RequestFailure::from_status(500, "/admin/dashboard/", ""),
            RequestFailure::Transport {
                url: "/admin/dashboard/".into(),
                message: "connection reset".into(),
            },
        ] {
            f.invalidator.on_failure(&request, &failure).await;
        }

        assert_eq!(
            f.store.presence().await,
            Presence {
                user: true,
                admin: true
            }
        );
        assert_eq!(
            f.navigator.current().unwrap().location.path(),
            "/admin/dashboard"
        );
    }

    #[tokio::test]
    async fn admin_401_on_admin_view_redirects_to_admin_login() {
        let f = fixture(RouteTable::default());
        both_logged_in(&f.store).await;
        let view = "/admin/dashboard?tab=users";
        f.navigator.navigate(view).await.unwrap();

        let (request, failure) = unauthorized("/admin/dashboard/");
        f.invalidator.on_failure(&request, &failure).await;

        let current = f.navigator.current().unwrap();
        assert_eq!(current.location.path(), "/admin/login");
        assert_eq!(
            current.location.query_param("redirect"),
            Some("/admin/dashboard?tab=users")
        );
    }

    #[tokio::test]
    async fn user_401_on_unguarded_view_does_not_redirect() {
        let f = fixture(RouteTable::default());
        f.store.set(CredentialKind::User, "u").await.unwrap();
        f.navigator.navigate("/chat").await.unwrap();

        let (request, failure) = unauthorized("/api/chat/send");
        f.invalidator.on_failure(&request, &failure).await;

        assert!(f.store.get(CredentialKind::User).await.is_none());
        assert_eq!(f.navigator.current().unwrap().location.path(), "/chat");
    }

    #[tokio::test]
    async fn user_401_on_user_view_redirects_to_login() {
        let f = fixture(guarded_chat_routes());
        f.store.set(CredentialKind::User, "u").await.unwrap();
        f.navigator.navigate("/chat").await.unwrap();

        let (request, failure) = unauthorized("/chat/send");
        f.invalidator.on_failure(&request, &failure).await;

        let current = f.navigator.current().unwrap();
        assert_eq!(current.location.path(), "/login");
        assert_eq!(current.location.query_param("redirect"), Some("/chat"));
    }

    #[tokio::test]
    async fn admin_401_on_user_view_does_not_redirect() {
        let f = fixture(guarded_chat_routes());
        both_logged_in(&f.store).await;
        f.navigator.navigate("/chat").await.unwrap();

        let (request, failure) = unauthorized("/admin/stats/");
        f.invalidator.on_failure(&request, &failure).await;

        assert!(!f.store.presence().await.admin);
        assert_eq!(f.navigator.current().unwrap().location.path(), "/chat");
    }

    #[tokio::test]
    async fn no_active_view_only_clears() {
        let f = fixture(RouteTable::default());
        f.store.set(CredentialKind::User, "u").await.unwrap();

        let (request, failure) = unauthorized("/user/info/");
        f.invalidator.on_failure(&request, &failure).await;

        assert!(f.store.get(CredentialKind::User).await.is_none());
        assert!(f.navigator.current().is_none());
    }

    #[tokio::test]
    async fn clearing_absent_credential_is_harmless() {
        let f = fixture(RouteTable::default());
        let (request, failure) = unauthorized("/admin/dashboard/");
        f.invalidator.on_failure(&request, &failure).await;
        assert_eq!(f.store.presence().await, Presence::default());
    }
}
