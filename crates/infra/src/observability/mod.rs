//! Tracing subscriber setup
//!
//! Installs a global `tracing-subscriber` registry with an [`EnvFilter`] and
//! either the human-readable or the JSON formatter. `RUST_LOG` overrides the
//! configured filter.

use marops_domain::{LoggingConfig, MarOpsError, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Build the filter: `RUST_LOG` when set and valid, otherwise the configured
/// directive.
///
/// # Errors
/// Returns `MarOpsError::Config` when the configured directive is invalid.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.filter)
        .map_err(|e| MarOpsError::Config(format!("Invalid log filter {:?}: {e}", config.filter)))
}

/// Install the global subscriber.
///
/// Returns `false` when a subscriber was already installed, e.g. by a test
/// harness or an embedding application; that is not an error.
///
/// # Errors
/// Returns `MarOpsError::Config` when the configured directive is invalid.
pub fn init_tracing(config: &LoggingConfig) -> Result<bool> {
    let filter = build_filter(config)?;
    let installed = if config.json {
        tracing_subscriber::registry().with(filter).with(fmt::layer().json()).try_init()
    } else {
        tracing_subscriber::registry().with(filter).with(fmt::layer()).try_init()
    };
    Ok(installed.is_ok())
}
