//! Cold-storage screens
//!
//! - [`ColdStorageQueue`]: lots waiting for the chamber check, today's first
//! - [`ColdStorageEditor`]: chamber counts of one lot and its material panel

pub mod editor;
pub mod queue;

pub use editor::{ChamberItemView, ColdStorageEditor};
pub use queue::{ColdStorageQueue, QueueEntry};
