//! Request failure taxonomy
//!
//! Every non-2xx response and every transport error becomes a
//! `RequestFailure`. Only `Authorization` (401) triggers session side effects;
//! all variants reach the caller unchanged.

/// Coarse class of an HTTP status for interceptor dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The credential was missing, invalid or expired
    Authorization,
    /// Anything else (4xx/5xx other than 401)
    Other,
}

/// Classify a non-success HTTP status.
pub fn classify_status(status: u16) -> FailureClass {
    match status {
        401 => FailureClass::Authorization,
        _ => FailureClass::Other,
    }
}

/// Errors returned by `SessionClient`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RequestFailure {
    #[error("authorization failed: {url} returned {status}")]
    Authorization {
        status: u16,
        url: String,
        body: String,
    },

    #[error("request failed: {url} returned {status}")]
    Http {
        status: u16,
        url: String,
        body: String,
    },

    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("invalid response body: {0}")]
    Decode(String),
}

impl RequestFailure {
    /// Build the failure for a non-success response.
    pub fn from_status(status: u16, url: impl Into<String>, body: impl Into<String>) -> Self {
        let url = url.into();
        let body = body.into();
        match classify_status(status) {
            FailureClass::Authorization => RequestFailure::Authorization { status, url, body },
            FailureClass::Other => RequestFailure::Http { status, url, body },
        }
    }

    /// HTTP status, when a response arrived.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestFailure::Authorization { status, .. } | RequestFailure::Http { status, .. } => {
                Some(*status)
            }
            RequestFailure::Transport { .. } | RequestFailure::Decode(_) => None,
        }
    }

    pub fn is_authorization(&self) -> bool {
        matches!(self, RequestFailure::Authorization { .. })
    }
}

/// Result alias for client operations.
pub type Result<T> = std::result::Result<T, RequestFailure>;
