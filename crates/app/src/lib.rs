//! # MarOps App
//!
//! Application layer - context and user-facing command flows.
//!
//! This crate contains:
//! - Application context (dependency injection)
//! - Session command flows (login, logout, restore)
//! - Command logging and health helpers
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires the gateway, the session and the navigator together
//! - Hands out per-screen controllers

pub mod commands;
pub mod context;
pub mod utils;

pub use context::AppContext;
