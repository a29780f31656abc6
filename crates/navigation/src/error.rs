//! Error types for navigation

/// Errors from route-table construction and navigation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid navigation target: {0}")]
    InvalidPath(String),

    #[error("invalid route table: {0}")]
    RouteTable(String),

    #[error("login route {0} is guarded, redirect would loop")]
    RedirectLoop(String),
}

/// Result alias for navigation operations.
pub type Result<T> = std::result::Result<T, Error>;
