//! Error types for the thesaurus API.

use thiserror::Error;

/// Result type alias using the thesaurus Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for thesaurus operations.
///
/// Every client-facing variant carries a declared HTTP status, see
/// [`Error::status_code`].
#[derive(Error, Debug)]
pub enum Error {
    /// One or more validation rules rejected the resource.
    #[error("Validation failed: {}", .0.join(" "))]
    Validation(Vec<String>),

    /// Malformed or missing request parameter.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String, status: u16 },

    /// Ownership or role mismatch.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource exists but has been soft-deleted
    #[error("Gone: {0}")]
    Gone(String),

    /// Unrecognized projection or sort field
    #[error("Invalid field: {0}")]
    InvalidField(String),

    /// Operation is illegal for the current state of the resource
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Search backend failed
    #[error("Search error: {0}")]
    Search(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Invalid argument surfaced as 400.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            message: message.into(),
            status: 400,
        }
    }

    /// Invalid argument surfaced as 412 (missing precondition such as tenant).
    pub fn precondition(message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            message: message.into(),
            status: 412,
        }
    }

    /// HTTP status declared for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) | Error::InvalidField(_) | Error::InvalidState(_) => 400,
            Error::InvalidArgument { status, .. } => *status,
            Error::Unauthorized(_) => 403,
            Error::NotFound(_) => 404,
            Error::Gone(_) => 410,
            Error::Database(_) | Error::Search(_) | Error::Request(_) => 502,
            Error::Serialization(_) | Error::Config(_) | Error::Internal(_) => 500,
        }
    }

    /// Whether the failure originates from an external collaborator.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Error::Database(_) | Error::Search(_) | Error::Request(_)
        )
    }

    /// Client-facing message without the variant prefix.
    pub fn message(&self) -> String {
        match self {
            Error::Validation(messages) => messages.join(" "),
            Error::InvalidArgument { message, .. } => message.clone(),
            Error::Unauthorized(msg)
            | Error::NotFound(msg)
            | Error::Gone(msg)
            | Error::InvalidField(msg)
            | Error::InvalidState(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_validation_joins_messages() {
        let err = Error::Validation(vec!["First.".to_string(), "Second.".to_string()]);
        assert_eq!(err.to_string(), "Validation failed: First. Second.");
    }

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("concept".to_string());
        assert_eq!(err.to_string(), "Not found: concept");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::Validation(vec![]).status_code(), 400);
        assert_eq!(Error::invalid_argument("x").status_code(), 400);
        assert_eq!(Error::precondition("x").status_code(), 412);
        assert_eq!(Error::Unauthorized("x".into()).status_code(), 403);
        assert_eq!(Error::NotFound("x".into()).status_code(), 404);
        assert_eq!(Error::Gone("x".into()).status_code(), 410);
        assert_eq!(Error::InvalidField("x".into()).status_code(), 400);
        assert_eq!(Error::Search("down".into()).status_code(), 502);
        assert_eq!(Error::Internal("x".into()).status_code(), 500);
    }

    #[test]
    fn test_message_strips_prefix() {
        let err = Error::precondition("No tenant specified");
        assert_eq!(err.message(), "No tenant specified");
        assert_eq!(err.to_string(), "Invalid argument: No tenant specified");
    }

    #[test]
    fn test_upstream_classification() {
        assert!(Error::Search("timeout".into()).is_upstream());
        assert!(Error::Request("refused".into()).is_upstream());
        assert!(!Error::NotFound("x".into()).is_upstream());
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
