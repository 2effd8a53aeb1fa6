//! # MarOps Domain
//!
//! Wire and domain types for the MarOps operations client.
//!
//! This crate contains:
//! - Backend entities (production lots, items, material lines, stock)
//! - The line status rule shared by every screen
//! - Domain error types and Result definitions
//! - Configuration structures and protocol constants
//!
//! ## Architecture
//! - No dependencies on other MarOps crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
