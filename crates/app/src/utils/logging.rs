use std::time::Duration;

use marops_domain::MarOpsError;
use tracing::{info, warn};

/// Log the outcome of a command execution with structured fields.
///
/// # Parameters
/// * `command` - Logical command identifier (e.g. `"session::login"`).
/// * `elapsed` - Duration the command execution took.
/// * `error_type` - [`error_label`] of the failure, `None` on success.
///
/// Callers must avoid forwarding sensitive values in `command`.
#[inline]
pub fn log_command_execution(command: &str, elapsed: Duration, error_type: Option<&str>) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    match error_type {
        None => info!(command, duration_ms, "command_execution_success"),
        Some(error_type) => {
            warn!(command, duration_ms, error_type, "command_execution_failure");
        }
    }
}

/// Convert a `MarOpsError` into a stable label suitable for logging.
#[inline]
#[must_use]
pub const fn error_label(error: &MarOpsError) -> &'static str {
    match error {
        MarOpsError::Config(_) => "config",
        MarOpsError::Network(_) => "network",
        MarOpsError::Auth(_) => "auth",
        MarOpsError::SessionExpired(_) => "session_expired",
        MarOpsError::NotFound(_) => "not_found",
        MarOpsError::InvalidInput(_) => "invalid_input",
        MarOpsError::Locked(_) => "locked",
        MarOpsError::Cache(_) => "cache",
        MarOpsError::Internal(_) => "internal",
    }
}
