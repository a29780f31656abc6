//! Console error types

use thiserror::Error;

/// Errors surfaced to the operator for a single command.
///
/// None of these end the session; the shell prints them and reads the next
/// line.
#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown command: {0} (try `help`)")]
    UnknownCommand(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("invalid JSON body: {0}")]
    InvalidJson(String),

    #[error(transparent)]
    Store(#[from] session_store::Error),

    #[error(transparent)]
    Navigation(#[from] navigation::Error),

    #[error(transparent)]
    Request(#[from] interceptor::RequestFailure),
}

/// Result alias using console Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages_are_descriptive() {
        assert_eq!(
            Error::UnknownCommand("frobnicate".into()).to_string(),
            "unknown command: frobnicate (try `help`)"
        );
        assert_eq!(
            Error::Usage("logout user|admin").to_string(),
            "usage: logout user|admin"
        );
        assert!(
            Error::InvalidJson("expected value".into())
                .to_string()
                .contains("expected value")
        );
    }

    #[test]
    fn wrapped_errors_keep_their_message() {
        let err: Error = navigation::Error::InvalidPath("chat".into()).into();
        assert_eq!(err.to_string(), "invalid navigation target: chat");

        let err: Error = session_store::Error::EmptyCredential("user").into();
        assert!(err.to_string().contains("empty user credential"));
    }
}
