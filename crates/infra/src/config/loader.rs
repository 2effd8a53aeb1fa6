//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the base URL is missing, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `MAROPS_API_BASE_URL`: Backend origin (required)
//! - `MAROPS_API_TIMEOUT_SECS`: Per-attempt timeout in seconds
//! - `MAROPS_API_MAX_ATTEMPTS`: Attempts for idempotent requests
//! - `MAROPS_INCREMENT_QUIET_MS`: Quiet window of +/- buttons
//! - `MAROPS_TYPED_QUIET_MS`: Quiet window of typed fields
//! - `MAROPS_CHART_TTL_SECS`: Age under which the cached chart is reused
//! - `MAROPS_CACHE_DIR`: Directory of the local chart cache
//! - `MAROPS_LOG_FILTER`: Default tracing filter
//! - `MAROPS_LOG_JSON`: Emit JSON logs (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./marops.json` or `./marops.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. `../../config.json` or `../../config.toml` (grandparent directory)
//! 5. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use marops_domain::{
    ApiConfig, AppConfig, CacheConfig, EditingConfig, LoggingConfig, MarOpsError, Result,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the required
/// variable is missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `MarOpsError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - A value fails validation
pub fn load() -> Result<AppConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Like [`load`], but falls back to the built-in defaults when no source
/// is available. Invalid sources are still errors.
///
/// # Errors
/// Returns `MarOpsError::Config` if a present source is malformed.
pub fn load_or_default() -> Result<AppConfig> {
    if std::env::var_os("MAROPS_API_BASE_URL").is_some() {
        return load_from_env();
    }
    match probe_config_paths() {
        Some(path) => load_from_file(Some(path)),
        None => {
            tracing::warn!("No configuration found; using defaults");
            Ok(AppConfig::default())
        }
    }
}

/// Load configuration from environment variables
///
/// `MAROPS_API_BASE_URL` must be present; every other variable falls back
/// to its default.
///
/// # Environment Variables
/// See module documentation for the complete list.
///
/// # Errors
/// Returns `MarOpsError::Config` if the base URL is missing or any value is
/// invalid.
pub fn load_from_env() -> Result<AppConfig> {
    let api_defaults = ApiConfig::default();
    let editing_defaults = EditingConfig::default();
    let cache_defaults = CacheConfig::default();
    let logging_defaults = LoggingConfig::default();

    let config = AppConfig {
        api: ApiConfig {
            base_url: env_var("MAROPS_API_BASE_URL")?,
            timeout_secs: env_parse("MAROPS_API_TIMEOUT_SECS", api_defaults.timeout_secs)?,
            max_attempts: env_parse("MAROPS_API_MAX_ATTEMPTS", api_defaults.max_attempts)?,
        },
        editing: EditingConfig {
            increment_quiet_ms: env_parse(
                "MAROPS_INCREMENT_QUIET_MS",
                editing_defaults.increment_quiet_ms,
            )?,
            typed_quiet_ms: env_parse("MAROPS_TYPED_QUIET_MS", editing_defaults.typed_quiet_ms)?,
            saved_feedback_ms: editing_defaults.saved_feedback_ms,
        },
        cache: CacheConfig {
            dir: std::env::var("MAROPS_CACHE_DIR").map_or(cache_defaults.dir, PathBuf::from),
            chart_ttl_secs: env_parse("MAROPS_CHART_TTL_SECS", cache_defaults.chart_ttl_secs)?,
            chart_refresh_secs: cache_defaults.chart_refresh_secs,
        },
        logging: LoggingConfig {
            filter: std::env::var("MAROPS_LOG_FILTER").unwrap_or(logging_defaults.filter),
            json: env_bool("MAROPS_LOG_JSON", logging_defaults.json),
        },
    };

    validate(&config)?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`probe_config_paths`].
///
/// # Errors
/// Returns `MarOpsError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - A value fails validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<AppConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(MarOpsError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            MarOpsError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| MarOpsError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    validate(&config)?;
    Ok(config)
}

/// Check values serde cannot.
///
/// # Errors
/// Returns `MarOpsError::Config` naming the first offending setting.
pub fn validate(config: &AppConfig) -> Result<()> {
    let parsed = url::Url::parse(&config.api.base_url).map_err(|e| {
        MarOpsError::Config(format!("Invalid API base URL {:?}: {e}", config.api.base_url))
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(MarOpsError::Config(format!(
            "API base URL must be http(s): {}",
            config.api.base_url
        )));
    }
    if config.api.timeout_secs == 0 {
        return Err(MarOpsError::Config("API timeout must be positive".to_string()));
    }
    if config.api.max_attempts == 0 {
        return Err(MarOpsError::Config("API max attempts must be at least 1".to_string()));
    }
    if config.editing.increment_quiet_ms == 0 || config.editing.typed_quiet_ms == 0 {
        return Err(MarOpsError::Config("Quiet windows must be positive".to_string()));
    }
    Ok(())
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `MarOpsError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<AppConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| MarOpsError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| MarOpsError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(MarOpsError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches for config files in the following locations (in order):
/// 1. Current working directory (`./config.{json,toml}`,
///    `./marops.{json,toml}`)
/// 2. Parent directories (up to 2 levels)
/// 3. Relative to executable location
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidates_in(dir: &Path) -> Vec<PathBuf> {
    vec![
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("marops.json"),
        dir.join("marops.toml"),
        dir.join("../config.json"),
        dir.join("../config.toml"),
        dir.join("../../config.json"),
        dir.join("../../config.toml"),
    ]
}

/// Get required environment variable
///
/// # Errors
/// Returns `MarOpsError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| MarOpsError::Config(format!("Missing required environment variable: {key}")))
}

/// Parse an optional environment variable, keeping `default` when unset.
///
/// # Errors
/// Returns `MarOpsError::Config` if the variable is set but unparsable.
fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| MarOpsError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(default),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const VARS: &[&str] = &[
        "MAROPS_API_BASE_URL",
        "MAROPS_API_TIMEOUT_SECS",
        "MAROPS_API_MAX_ATTEMPTS",
        "MAROPS_INCREMENT_QUIET_MS",
        "MAROPS_TYPED_QUIET_MS",
        "MAROPS_CHART_TTL_SECS",
        "MAROPS_CACHE_DIR",
        "MAROPS_LOG_FILTER",
        "MAROPS_LOG_JSON",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        std::env::set_var("MAROPS_TEST_BOOL_YES", "yes");
        std::env::set_var("MAROPS_TEST_BOOL_UPPER", "TRUE");
        std::env::set_var("MAROPS_TEST_BOOL_OFF", "off");
        std::env::remove_var("MAROPS_TEST_BOOL_MISSING");

        assert!(env_bool("MAROPS_TEST_BOOL_YES", false));
        assert!(env_bool("MAROPS_TEST_BOOL_UPPER", false));
        assert!(!env_bool("MAROPS_TEST_BOOL_OFF", true));
        assert!(env_bool("MAROPS_TEST_BOOL_MISSING", true));

        std::env::remove_var("MAROPS_TEST_BOOL_YES");
        std::env::remove_var("MAROPS_TEST_BOOL_UPPER");
        std::env::remove_var("MAROPS_TEST_BOOL_OFF");
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("MAROPS_API_BASE_URL", "https://ops.example.com");
        std::env::set_var("MAROPS_API_TIMEOUT_SECS", "10");
        std::env::set_var("MAROPS_API_MAX_ATTEMPTS", "5");
        std::env::set_var("MAROPS_INCREMENT_QUIET_MS", "800");
        std::env::set_var("MAROPS_TYPED_QUIET_MS", "1500");
        std::env::set_var("MAROPS_CHART_TTL_SECS", "120");
        std::env::set_var("MAROPS_CACHE_DIR", "/tmp/marops-cache");
        std::env::set_var("MAROPS_LOG_FILTER", "marops_core=debug");
        std::env::set_var("MAROPS_LOG_JSON", "true");

        let result = load_from_env();
        clear_env();
        let config = result.expect("config from env");

        assert_eq!(config.api.base_url, "https://ops.example.com");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.api.max_attempts, 5);
        assert_eq!(config.editing.increment_quiet_ms, 800);
        assert_eq!(config.editing.typed_quiet_ms, 1500);
        assert_eq!(config.editing.saved_feedback_ms, 2500);
        assert_eq!(config.cache.chart_ttl_secs, 120);
        assert_eq!(config.cache.dir, PathBuf::from("/tmp/marops-cache"));
        assert_eq!(config.logging.filter, "marops_core=debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_load_from_env_only_base_url() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("MAROPS_API_BASE_URL", "http://10.0.0.5:8000");

        let result = load_from_env();
        clear_env();
        let config = result.expect("config from env");

        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.editing, EditingConfig::default());
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_load_from_env_missing_base_url() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, MarOpsError::Config(_)), "Should be a Config error");
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("MAROPS_API_BASE_URL", "http://localhost:8000");
        std::env::set_var("MAROPS_API_MAX_ATTEMPTS", "three");

        let result = load_from_env();
        clear_env();

        let err = result.unwrap_err();
        assert!(err.to_string().contains("MAROPS_API_MAX_ATTEMPTS"));
    }

    #[test]
    fn test_load_from_env_rejects_relative_url() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("MAROPS_API_BASE_URL", "api.local");

        let result = load_from_env();
        clear_env();

        assert!(matches!(result, Err(MarOpsError::Config(_))));
    }

    #[test]
    fn test_load_from_file_json() {
        let json_content = r#"{
            "api": {"base_url": "https://ops.example.com", "max_attempts": 2},
            "editing": {"typed_quiet_ms": 1200},
            "logging": {"json": true}
        }"#;

        let mut temp_file = NamedTempFile::with_suffix(".json").unwrap();
        temp_file.write_all(json_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_from_file(Some(temp_file.path().to_path_buf())).unwrap();
        assert_eq!(config.api.base_url, "https://ops.example.com");
        assert_eq!(config.api.max_attempts, 2);
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.editing.typed_quiet_ms, 1200);
        assert_eq!(config.editing.increment_quiet_ms, 1000);
        assert!(config.logging.json);
    }

    #[test]
    fn test_load_from_file_toml() {
        let toml_content = r#"
[api]
base_url = "http://127.0.0.1:8000"

[cache]
dir = "/var/cache/marops"
chart_ttl_secs = 60
"#;

        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_from_file(Some(temp_file.path().to_path_buf())).unwrap();
        assert_eq!(config.api.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.cache.dir, PathBuf::from("/var/cache/marops"));
        assert_eq!(config.cache.chart_ttl_secs, 60);
        assert_eq!(config.cache.chart_refresh_secs, 300);
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/marops.json")));
        assert!(matches!(result, Err(MarOpsError::Config(_))));
    }

    #[test]
    fn test_load_from_file_invalid_json() {
        let mut temp_file = NamedTempFile::with_suffix(".json").unwrap();
        temp_file.write_all(b"{ invalid json }").unwrap();
        temp_file.flush().unwrap();

        let err = load_from_file(Some(temp_file.path().to_path_buf())).unwrap_err();
        assert!(err.to_string().contains("Invalid JSON"));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let mut config = AppConfig::default();
        config.api.max_attempts = 0;
        assert!(validate(&config).is_err());
        assert!(validate(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("anything", Path::new("config.yaml"));
        assert!(result.unwrap_err().to_string().contains("Unsupported config format"));
    }
}
