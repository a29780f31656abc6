//! Navigation guard decision
//!
//! Pure function of (route requirement, credential presence, target). The
//! navigator performs the store read and commits the result.

use session_store::{CredentialKind, Presence};

use crate::location::Location;
use crate::route::{ADMIN_LOGIN_PATH, AccessRequirement, LOGIN_PATH, REDIRECT_PARAM};

/// Outcome of checking a navigation intent.
///
/// Redirect variants carry the full originally-requested path so the login
/// view can resume it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    Allowed,
    RedirectToUserLogin { resume: String },
    RedirectToAdminLogin { resume: String },
}

impl NavigationDecision {
    pub fn is_redirect(&self) -> bool {
        !matches!(self, NavigationDecision::Allowed)
    }

    /// Login location replacing the intent, or `None` when allowed.
    pub fn login_target(&self) -> Option<Location> {
        match self {
            NavigationDecision::Allowed => None,
            NavigationDecision::RedirectToUserLogin { resume } => {
                Some(login_location(CredentialKind::User, Some(resume.as_str())))
            }
            NavigationDecision::RedirectToAdminLogin { resume } => {
                Some(login_location(CredentialKind::Admin, Some(resume.as_str())))
            }
        }
    }
}

/// Decide whether a navigation to `full_path` may proceed.
pub fn evaluate(
    requirement: AccessRequirement,
    presence: Presence,
    full_path: &str,
) -> NavigationDecision {
    match requirement {
        AccessRequirement::None => NavigationDecision::Allowed,
        AccessRequirement::RequiresUser if presence.user => NavigationDecision::Allowed,
        AccessRequirement::RequiresUser => NavigationDecision::RedirectToUserLogin {
            resume: full_path.to_string(),
        },
        AccessRequirement::RequiresAdmin if presence.admin => NavigationDecision::Allowed,
        AccessRequirement::RequiresAdmin => NavigationDecision::RedirectToAdminLogin {
            resume: full_path.to_string(),
        },
    }
}

/// Login view for a credential kind.
pub fn login_path(kind: CredentialKind) -> &'static str {
    match kind {
        CredentialKind::User => LOGIN_PATH,
        CredentialKind::Admin => ADMIN_LOGIN_PATH,
    }
}

/// Login location, with the resumption parameter when given.
pub fn login_location(kind: CredentialKind, resume: Option<&str>) -> Location {
    let path = login_path(kind);
    match resume {
        Some(resume) => Location::with_param(path, REDIRECT_PARAM, resume),
        None => Location::bare(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_PRESENCE: [Presence; 4] = [
        Presence {
            user: false,
            admin: false,
        },
        Presence {
            user: true,
            admin: false,
        },
        Presence {
            user: false,
            admin: true,
        },
        Presence {
            user: true,
            admin: true,
        },
    ];

    #[test]
    fn unguarded_routes_never_redirect() {
        for presence in ALL_PRESENCE {
            assert_eq!(
                evaluate(AccessRequirement::None, presence, "/chat"),
                NavigationDecision::Allowed
            );
        }
    }

    #[test]
    fn admin_route_without_admin_redirects_with_resume() {
        for presence in ALL_PRESENCE.iter().filter(|p| !p.admin) {
            let decision = evaluate(
                AccessRequirement::RequiresAdmin,
                *presence,
                "/admin/dashboard",
            );
            assert_eq!(
                decision,
                NavigationDecision::RedirectToAdminLogin {
                    resume: "/admin/dashboard".into()
                }
            );
            let target = decision.login_target().unwrap();
            assert_eq!(target.path(), "/admin/login");
            assert_eq!(target.query_param("redirect"), Some("/admin/dashboard"));
        }
    }

    #[test]
    fn admin_route_with_admin_is_allowed() {
        let presence = Presence {
            user: false,
            admin: true,
        };
        assert_eq!(
            evaluate(AccessRequirement::RequiresAdmin, presence, "/admin/dashboard"),
            NavigationDecision::Allowed
        );
    }

    #[test]
    fn user_route_only_accepts_user_credential() {
        let admin_only = Presence {
            user: false,
            admin: true,
        };
        let decision = evaluate(AccessRequirement::RequiresUser, admin_only, "/chat?id=7");
        assert_eq!(
            decision,
            NavigationDecision::RedirectToUserLogin {
                resume: "/chat?id=7".into()
            }
        );
        let target = decision.login_target().unwrap();
        assert_eq!(target.path(), "/login");
        assert_eq!(target.query_param("redirect"), Some("/chat?id=7"));

        let user = Presence {
            user: true,
            admin: false,
        };
        assert!(!evaluate(AccessRequirement::RequiresUser, user, "/chat").is_redirect());
    }

    #[test]
    fn allowed_has_no_login_target() {
        assert!(NavigationDecision::Allowed.login_target().is_none());
    }

    #[test]
    fn login_location_without_resume_is_bare_path() {
        let loc = login_location(CredentialKind::Admin, None);
        assert_eq!(loc.full_path(), "/admin/login");
        assert_eq!(loc.query_param("redirect"), None);
    }
}
