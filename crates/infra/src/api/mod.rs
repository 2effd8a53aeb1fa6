//! Backend gateway for MarOps
//!
//! This module provides the HTTP gateway to the operations backend and the
//! port implementations built on it.
//!
//! # Architecture
//!
//! - Uses [`crate::http::HttpClient`] (no direct reqwest in callers)
//! - Cookie credentials, refreshed once per expiry for all queued callers
//! - Transport retries for idempotent requests only
//! - Background scheduler for the stock chart refresh

pub mod auth;
pub mod client;
pub mod commands;
pub mod errors;
pub mod scheduler;

pub use auth::ApiAuthService;
pub use client::{ApiClient, ApiClientConfig, REFRESH_PATH};
pub use commands::ApiCommands;
pub use errors::{ApiError, ApiErrorCategory};
pub use scheduler::{ChartScheduler, SchedulerConfig};
