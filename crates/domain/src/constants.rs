//! Application constants
//!
//! Centralized location for domain-level constants used throughout the
//! application.

// Quantity-adjustment protocol
pub const INCREMENT_QUIET_MS: u64 = 1000;
pub const TYPED_QUIET_MS: u64 = 2000;
pub const SAVED_FEEDBACK_MS: u64 = 2500;

// Stock chart
pub const CHART_CACHE_KEY: &str = "grafico_estoque_cache_v1";
pub const CHART_TTL_SECS: u64 = 300;
pub const CHART_REFRESH_SECS: u64 = 300;
pub const CHART_TOP_N: usize = 10;

// Stock overview
pub const OVERVIEW_TOP_N: usize = 5;

// Gateway
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_CACHE_DIR: &str = ".marops-cache";

// Routes
pub const LOGIN_PATH: &str = "/login";
pub const FORBIDDEN_PATH: &str = "/sem-permissao";

// Material-list draft
pub const DEFAULT_REQUIRED_QUANTITY: f64 = 1.0;
