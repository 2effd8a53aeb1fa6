//! Command execution helpers
//!
//! Provides utilities to reduce boilerplate when implementing commands with
//! timing and outcome logging.

use std::future::Future;
use std::time::Instant;

use marops_domain::Result as DomainResult;

use crate::utils::logging::{error_label, log_command_execution};

/// Execute a command with automatic timing and outcome logging
///
/// # Example
///
/// ```rust,ignore
/// pub async fn finalize(ctx: &AppContext, lot: &RecordId) -> Result<()> {
///     let editor = ctx.production_editor(lot.clone());
///     execute_with_logging("production::finalize", || async {
///         editor.load().await;
///         editor.finalize().await
///     })
///     .await
/// }
/// ```
pub async fn execute_with_logging<F, Fut, T>(command_name: &str, command_fn: F) -> DomainResult<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = DomainResult<T>>,
{
    let start = Instant::now();
    let result = command_fn().await;

    let error_type = result.as_ref().err().map(error_label);
    log_command_execution(command_name, start.elapsed(), error_type);

    result
}

/// Execute a command with String error conversion, for callers that only
/// display the message.
pub async fn execute_with_string_error<F, Fut, T>(
    command_name: &str,
    command_fn: F,
) -> Result<T, String>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = DomainResult<T>>,
{
    execute_with_logging(command_name, command_fn).await.map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use marops_domain::MarOpsError;

    use super::*;

    #[tokio::test]
    async fn passes_the_result_through() {
        let ok = execute_with_logging("test::ok", || async { Ok(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        let err = execute_with_string_error::<_, _, ()>("test::err", || async {
            Err(MarOpsError::Locked("production lot 3 is finalized".into()))
        })
        .await;
        assert_eq!(err.unwrap_err(), "Locked: production lot 3 is finalized");
    }
}
