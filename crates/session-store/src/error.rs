//! Error types for credential storage

/// Errors from credential store operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("credential file parse error: {0}")]
    Parse(String),

    #[error("refusing to store an empty {0} credential")]
    EmptyCredential(&'static str),
}

/// Result alias for store operations.
pub type Result<T> = std::result::Result<T, Error>;
