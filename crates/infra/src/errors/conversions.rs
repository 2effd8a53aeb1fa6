//! Conversions from external infrastructure errors into domain errors.

use marops_domain::MarOpsError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub MarOpsError);

impl From<InfraError> for MarOpsError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<MarOpsError> for InfraError {
    fn from(value: MarOpsError) -> Self {
        Self(value)
    }
}

trait IntoMarOpsError {
    fn into_marops(self) -> MarOpsError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → MarOpsError */
/* -------------------------------------------------------------------------- */

impl IntoMarOpsError for HttpError {
    fn into_marops(self) -> MarOpsError {
        if self.is_timeout() {
            return MarOpsError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return MarOpsError::Network("HTTP connection failure".into());
        }

        if self.is_builder() {
            return MarOpsError::Config(format!("invalid HTTP request: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => MarOpsError::Auth(message),
                404 => MarOpsError::NotFound(message),
                400..=499 => MarOpsError::InvalidInput(message),
                _ => MarOpsError::Network(message),
            };
        }

        MarOpsError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        Self(value.into_marops())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → MarOpsError */
/* -------------------------------------------------------------------------- */

impl IntoMarOpsError for std::io::Error {
    fn into_marops(self) -> MarOpsError {
        match self.kind() {
            std::io::ErrorKind::NotFound => MarOpsError::NotFound(self.to_string()),
            _ => MarOpsError::Cache(format!("filesystem error: {self}")),
        }
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        Self(value.into_marops())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → MarOpsError */
/* -------------------------------------------------------------------------- */

impl IntoMarOpsError for serde_json::Error {
    fn into_marops(self) -> MarOpsError {
        MarOpsError::Internal(format!("JSON error at line {}: {self}", self.line()))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        Self(value.into_marops())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
