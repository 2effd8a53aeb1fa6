//! # MarOps Core
//!
//! Client-side behaviour of the operations dashboard, free of transport code.
//!
//! This crate contains:
//! - The quantity-adjustment protocol and typed-field debounce
//! - Session store, route guard and navigation shell
//! - Per-screen controllers (production, cold storage, stock)
//! - Port interfaces (traits) implemented by `marops-infra`
//!
//! ## Architecture Principles
//! - Only depends on `marops-domain`
//! - No HTTP or filesystem code
//! - All external dependencies via traits
//! - Controllers own their state; renderers read snapshots

pub mod adjustment;
pub mod clock;
pub mod cold_storage;
pub mod navigation;
pub mod production;
pub mod session;
pub mod stock;

// Re-export specific items to avoid ambiguity
pub use adjustment::ports::DeltaWriter;
pub use adjustment::{FieldDebouncer, QuantityAdjuster, SaveFeedback};
pub use cold_storage::{ColdStorageEditor, ColdStorageQueue};
pub use navigation::ports::LoginRedirect;
pub use navigation::{GuardOutcome, Navigator, RouteTable, Screen};
pub use production::ports::ProductionPort;
pub use production::{MaterialListDraft, ProductionBoard, ProductionEditor};
pub use session::ports::AuthPort;
pub use session::{SessionState, SessionStore};
pub use stock::ports::{ChartCachePort, StockPort};
pub use stock::{StockChart, StockIntakeForm, StockOverview};
