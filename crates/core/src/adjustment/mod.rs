//! Debounced quantity editing
//!
//! Two flavours share one timer primitive:
//! - [`QuantityAdjuster`]: signed deltas from increment buttons, coalesced per
//!   line and sent as one net write per quiet window.
//! - [`FieldDebouncer`]: typed absolute values, saved once the field has been
//!   quiet for a while.

pub mod field;
pub mod ports;
pub mod protocol;
mod timer;

pub use field::{FieldDebouncer, SaveFeedback};
pub use protocol::{AdjustableLine, LineView, QuantityAdjuster};
