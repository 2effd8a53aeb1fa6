//! Configuration management

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    CHART_REFRESH_SECS, CHART_TTL_SECS, DEFAULT_API_BASE_URL, DEFAULT_CACHE_DIR,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_REQUEST_TIMEOUT_SECS, INCREMENT_QUIET_MS, SAVED_FEEDBACK_MS,
    TYPED_QUIET_MS,
};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub editing: EditingConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Transport attempts for idempotent requests, including the first.
    pub max_attempts: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl ApiConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Debounce windows of the editing screens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditingConfig {
    /// Quiet interval for increment/decrement buttons.
    pub increment_quiet_ms: u64,
    /// Quiet interval for typed quantity fields.
    pub typed_quiet_ms: u64,
    /// How long the "saved" marker stays visible.
    pub saved_feedback_ms: u64,
}

impl Default for EditingConfig {
    fn default() -> Self {
        Self {
            increment_quiet_ms: INCREMENT_QUIET_MS,
            typed_quiet_ms: TYPED_QUIET_MS,
            saved_feedback_ms: SAVED_FEEDBACK_MS,
        }
    }
}

impl EditingConfig {
    #[must_use]
    pub const fn increment_quiet(&self) -> Duration {
        Duration::from_millis(self.increment_quiet_ms)
    }

    #[must_use]
    pub const fn typed_quiet(&self) -> Duration {
        Duration::from_millis(self.typed_quiet_ms)
    }

    #[must_use]
    pub const fn saved_feedback(&self) -> Duration {
        Duration::from_millis(self.saved_feedback_ms)
    }
}

/// Local chart cache settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub dir: PathBuf,
    pub chart_ttl_secs: u64,
    pub chart_refresh_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_CACHE_DIR),
            chart_ttl_secs: CHART_TTL_SECS,
            chart_refresh_secs: CHART_REFRESH_SECS,
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub const fn chart_ttl(&self) -> Duration {
        Duration::from_secs(self.chart_ttl_secs)
    }

    #[must_use]
    pub const fn chart_refresh(&self) -> Duration {
        Duration::from_secs(self.chart_refresh_secs)
    }
}

/// Tracing output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: "info".to_string(), json: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_protocol_constants() {
        let config = AppConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.editing.increment_quiet(), Duration::from_millis(1000));
        assert_eq!(config.editing.typed_quiet(), Duration::from_millis(2000));
        assert_eq!(config.cache.chart_ttl(), Duration::from_secs(300));
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"api": {"base_url": "https://ops.example.com"}}"#).unwrap();
        assert_eq!(config.api.base_url, "https://ops.example.com");
        assert_eq!(config.api.max_attempts, 3);
        assert_eq!(config.editing, EditingConfig::default());
    }
}
