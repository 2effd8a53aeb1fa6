//! Production screens
//!
//! - [`ProductionBoard`]: today's and still-open lots, lot creation
//! - [`ProductionEditor`]: items of one lot, typed production counts,
//!   finalization and the lot's material list
//! - [`MaterialListDraft`]: editable material list saved in one request

pub mod board;
pub mod editor;
pub mod materials;
pub mod ports;
pub mod writers;

pub use board::ProductionBoard;
pub use editor::{ItemView, ProductionEditor};
pub use materials::MaterialListDraft;
pub use writers::{ItemCountWriter, MaterialSupplyWriter};
