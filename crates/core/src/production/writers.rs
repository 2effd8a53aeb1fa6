//! Adapters from the production port to the debounce writers

use std::sync::Arc;

use async_trait::async_trait;
use marops_domain::{ItemCountField, LineStatus, RecordId, Result};

use super::ports::ProductionPort;
use crate::adjustment::ports::{DeltaWriter, FieldWriter};

/// Saves typed item counts with `PATCH`.
pub struct ItemCountWriter {
    port: Arc<dyn ProductionPort>,
}

impl ItemCountWriter {
    pub fn new(port: Arc<dyn ProductionPort>) -> Self {
        Self { port }
    }
}

#[async_trait]
impl FieldWriter for ItemCountWriter {
    async fn write_field(
        &self,
        item: &RecordId,
        field: ItemCountField,
        value: f64,
    ) -> Result<Option<LineStatus>> {
        self.port.update_item_count(item, field, value).await
    }
}

/// Sends material deltas of one lot to the `fornecer` endpoint.
pub struct MaterialSupplyWriter {
    port: Arc<dyn ProductionPort>,
    lot: RecordId,
}

impl MaterialSupplyWriter {
    pub fn new(port: Arc<dyn ProductionPort>, lot: RecordId) -> Self {
        Self { port, lot }
    }
}

#[async_trait]
impl DeltaWriter for MaterialSupplyWriter {
    async fn write_delta(&self, line: &RecordId, delta: f64) -> Result<Option<f64>> {
        self.port.supply_material(&self.lot, line, delta).await
    }
}
