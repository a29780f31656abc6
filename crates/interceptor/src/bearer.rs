//! Bearer token attachment
//!
//! Reads the credential store for every outgoing request and sets
//! `Authorization: Bearer <token>`. With no usable credential the request
//! passes through unmodified; it is never blocked here.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use serde::Deserialize;
use session_store::{Credential, CredentialKind, CredentialStore};
use tracing::{debug, warn};

use crate::pipeline::{BoxFuture, RequestInterceptor};
use crate::request::PendingRequest;

/// How the credential for a request is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// First match wins: user credential, then admin. The URL is not
    /// inspected, so an admin endpoint called while both sessions exist
    /// receives the user token.
    #[default]
    PreferUser,
    /// Only the credential matching the request's scope (`/admin/` URLs get
    /// the admin token, everything else the user token).
    ByScope,
}

pub struct BearerAuth {
    store: Arc<CredentialStore>,
    policy: SelectionPolicy,
}

impl BearerAuth {
    pub fn new(store: Arc<CredentialStore>, policy: SelectionPolicy) -> Self {
        Self { store, policy }
    }

    async fn resolve(&self, request: &PendingRequest) -> Option<Credential> {
        match self.policy {
            SelectionPolicy::PreferUser => match self.store.get(CredentialKind::User).await {
                Some(user) => Some(user),
                None => self.store.get(CredentialKind::Admin).await,
            },
            SelectionPolicy::ByScope => self.store.get(request.scope().credential()).await,
        }
    }
}

impl RequestInterceptor for BearerAuth {
    fn id(&self) -> &str {
        "bearer"
    }

    fn intercept<'a>(&'a self, request: &'a mut PendingRequest) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            let Some(credential) = self.resolve(request).await else {
                debug!(request_id = %request.request_id, "no credential, sending unauthenticated");
                return;
            };

            let mut value =
                match HeaderValue::from_str(&format!("Bearer {}", credential.token.expose())) {
                    Ok(v) => v,
                    Err(e) => {
                        warn!(
                            request_id = %request.request_id,
                            kind = %credential.kind,
                            error = %e,
                            "stored token is not a valid header value, sending unauthenticated"
                        );
                        return;
                    }
                };
            value.set_sensitive(true);
            request.headers.insert(AUTHORIZATION, value);
            debug!(
                request_id = %request.request_id,
                kind = %credential.kind,
                "attached credential"
            );
        })
    }
}
