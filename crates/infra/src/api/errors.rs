//! Gateway error types
//!
//! Classifies transport and status failures before they cross the port
//! boundary as [`MarOpsError`].

use std::time::Duration;

use marops_domain::MarOpsError;
use reqwest::StatusCode;
use thiserror::Error;

/// Categories of gateway errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// 401/403, or a refresh that could not restore the session
    Authentication,
    /// 404
    NotFound,
    /// 429
    RateLimit,
    /// 5xx
    Server,
    /// Other 4xx; the request itself is wrong
    Client,
    /// Connection failures and timeouts
    Network,
    /// Unexpected response bodies and local misconfiguration
    Internal,
}

/// Gateway operation errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Session expired: {0}")]
    SessionExpired(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Client error: {0}")]
    Client(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),
}

impl ApiError {
    /// Get the error category for this error
    #[must_use]
    pub const fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Auth(_) | Self::SessionExpired(_) => ApiErrorCategory::Authentication,
            Self::NotFound(_) => ApiErrorCategory::NotFound,
            Self::RateLimit(_) => ApiErrorCategory::RateLimit,
            Self::Server(_) => ApiErrorCategory::Server,
            Self::Client(_) => ApiErrorCategory::Client,
            Self::Network(_) | Self::Timeout(_) => ApiErrorCategory::Network,
            Self::Decode(_) | Self::Config(_) => ApiErrorCategory::Internal,
        }
    }

    /// Classify a non-success response.
    #[must_use]
    pub fn from_status(status: StatusCode, url: &str, body: &str) -> Self {
        let message = if body.is_empty() {
            format!("{url} returned status {status}")
        } else {
            format!("{url} returned status {status}: {body}")
        };

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Auth(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimit(message),
            s if s.is_server_error() => Self::Server(message),
            s if s.is_client_error() => Self::Client(message),
            _ => Self::Network(message),
        }
    }

    /// Whether the backend answered 404 (or an equivalent empty resource).
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<MarOpsError> for ApiError {
    fn from(err: MarOpsError) -> Self {
        match err {
            MarOpsError::Network(message) => Self::Network(message),
            MarOpsError::Auth(message) => Self::Auth(message),
            MarOpsError::SessionExpired(message) => Self::SessionExpired(message),
            MarOpsError::NotFound(message) => Self::NotFound(message),
            MarOpsError::Config(message) => Self::Config(message),
            MarOpsError::InvalidInput(message) | MarOpsError::Locked(message) => {
                Self::Client(message)
            }
            MarOpsError::Cache(message) | MarOpsError::Internal(message) => Self::Decode(message),
        }
    }
}

impl From<ApiError> for MarOpsError {
    fn from(err: ApiError) -> Self {
        let message = err.to_string();
        match err {
            ApiError::Auth(_) => Self::Auth(message),
            ApiError::SessionExpired(_) => Self::SessionExpired(message),
            ApiError::NotFound(_) => Self::NotFound(message),
            ApiError::RateLimit(_)
            | ApiError::Server(_)
            | ApiError::Network(_)
            | ApiError::Timeout(_) => Self::Network(message),
            ApiError::Client(_) => Self::InvalidInput(message),
            ApiError::Decode(_) => Self::Internal(message),
            ApiError::Config(_) => Self::Config(message),
        }
    }
}
