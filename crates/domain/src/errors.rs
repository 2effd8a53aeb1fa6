//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for MarOps
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum MarOpsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    /// Token refresh failed; the user has to log in again.
    #[error("Session expired: {0}")]
    SessionExpired(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Synchronous validation failure raised before any network call.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Mutation attempted on a finalized lot.
    #[error("Locked: {0}")]
    Locked(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MarOpsError {
    /// Whether the error means the current session is gone.
    #[must_use]
    pub const fn is_session_error(&self) -> bool {
        matches!(self, Self::Auth(_) | Self::SessionExpired(_))
    }
}

/// Result type alias for MarOps operations
pub type Result<T> = std::result::Result<T, MarOpsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let err = MarOpsError::Locked("lot 7 is finalized".into());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "Locked");
        assert_eq!(json["message"], "lot 7 is finalized");
    }

    #[test]
    fn session_errors_are_flagged() {
        assert!(MarOpsError::SessionExpired("refresh failed".into()).is_session_error());
        assert!(MarOpsError::Auth("401".into()).is_session_error());
        assert!(!MarOpsError::Network("timeout".into()).is_session_error());
    }
}
