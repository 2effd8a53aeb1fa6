//! Port interfaces for debounced writes

use async_trait::async_trait;
use marops_domain::{ItemCountField, LineStatus, RecordId, Result};

/// Destination of coalesced quantity deltas
#[async_trait]
pub trait DeltaWriter: Send + Sync {
    /// Send one net delta for `line`.
    ///
    /// Returns the confirmed quantity when the server reports it.
    async fn write_delta(&self, line: &RecordId, delta: f64) -> Result<Option<f64>>;
}

/// Destination of debounced absolute values typed into item count fields
#[async_trait]
pub trait FieldWriter: Send + Sync {
    /// Save `value` into `field` of `item`.
    ///
    /// Returns the status the server computed for the item, if any.
    async fn write_field(
        &self,
        item: &RecordId,
        field: ItemCountField,
        value: f64,
    ) -> Result<Option<LineStatus>>;
}
