//! Outgoing requests and their credential scope

use navigation::AccessRequirement;
use reqwest::Method;
use reqwest::header::HeaderMap;
use session_store::CredentialKind;
use std::fmt;

/// URL segment that marks a request as admin-scoped.
const ADMIN_SEGMENT: &str = "/admin/";

/// A request travelling through the pipeline.
///
/// `url` is the path as the caller wrote it (e.g. `/admin/dashboard/`), not
/// the resolved absolute URL; scope classification works on this form.
/// Headers stay mutable until dispatch.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub request_id: String,
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
}

impl PendingRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            request_id: format!("req_{}", uuid::Uuid::new_v4().as_simple()),
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn with_json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn scope(&self) -> RequestScope {
        RequestScope::of_url(&self.url)
    }

    /// Current Authorization header, if set and valid UTF-8.
    pub fn authorization(&self) -> Option<&str> {
        self.headers
            .get(reqwest::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
    }
}

/// Which session a request belongs to, judged from its URL alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestScope {
    User,
    Admin,
}

impl RequestScope {
    /// Admin-scoped iff the URL contains the literal segment `/admin/`.
    pub fn of_url(url: &str) -> Self {
        if url.contains(ADMIN_SEGMENT) {
            RequestScope::Admin
        } else {
            RequestScope::User
        }
    }

    pub fn credential(self) -> CredentialKind {
        match self {
            RequestScope::User => CredentialKind::User,
            RequestScope::Admin => CredentialKind::Admin,
        }
    }

    /// The route requirement that depends on this scope's credential.
    pub fn requirement(self) -> AccessRequirement {
        AccessRequirement::from(self.credential())
    }

    pub fn label(self) -> &'static str {
        self.credential().label()
    }
}

impl fmt::Display for RequestScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_segment_anywhere_marks_admin_scope() {
        assert_eq!(RequestScope::of_url("/admin/users/"), RequestScope::Admin);
        assert_eq!(
            RequestScope::of_url("http://host/api/admin/stats"),
            RequestScope::Admin
        );
    }

    #[test]
    fn admin_without_trailing_slash_is_user_scope() {
        assert_eq!(RequestScope::of_url("/admin"), RequestScope::User);
        assert_eq!(RequestScope::of_url("/administrator/x"), RequestScope::User);
        assert_eq!(RequestScope::of_url("/api/chat/send"), RequestScope::User);
    }

    #[test]
    fn scope_maps_to_credential_and_requirement() {
        assert_eq!(RequestScope::Admin.credential(), CredentialKind::Admin);
        assert_eq!(
            RequestScope::User.requirement(),
            AccessRequirement::RequiresUser
        );
        assert_eq!(
            RequestScope::Admin.requirement(),
            AccessRequirement::RequiresAdmin
        );
    }

    #[test]
    fn request_ids_are_unique_and_prefixed() {
        let a = PendingRequest::get("/user/info/");
        let b = PendingRequest::get("/user/info/");
        assert!(a.request_id.starts_with("req_"));
        assert_ne!(a.request_id, b.request_id);
    }

    #[test]
    fn builder_sets_method_and_body() {
        let req = PendingRequest::post("/chat/send").with_json(serde_json::json!({"q": "hi"}));
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.body.unwrap()["q"], "hi");
        assert!(req.headers.is_empty());
    }
}
