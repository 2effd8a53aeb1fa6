//! # MarOps Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - HTTP transport with cookie credentials and idempotent retries
//! - The backend gateway (session refresh, status classification)
//! - Port implementations for auth, production and stock endpoints
//! - File-backed chart cache and its refresh scheduler
//! - Configuration loading and tracing setup
//!
//! ## Architecture
//! - Implements traits defined in `marops-core`
//! - Contains all "impure" code (network, filesystem, environment)

pub mod api;
pub mod cache;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use api::{ApiAuthService, ApiClient, ApiClientConfig, ApiCommands, ApiError, ChartScheduler};
pub use cache::FileChartCache;
pub use errors::InfraError;
pub use http::HttpClient;
