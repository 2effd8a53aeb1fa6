use std::sync::Arc;

use chrono::NaiveDate;
use marops_domain::utils::lenient::round2;
use marops_domain::{LotStatus, ProductionLot, RecordId};
use parking_lot::RwLock;
use tracing::{instrument, warn};

use crate::clock::{system_today, Today};
use crate::production::ports::ProductionPort;

/// One row of the queue.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueEntry {
    pub id: RecordId,
    pub data: NaiveDate,
    pub status: LotStatus,
    pub item_count: usize,
    /// Planned quantity over all items, rounded to 2 decimals.
    pub planned_total: f64,
    pub is_today: bool,
}

impl QueueEntry {
    fn from_lot(lot: &ProductionLot, today: NaiveDate) -> Self {
        Self {
            id: lot.id.clone(),
            data: lot.data,
            status: lot.status.clone(),
            item_count: lot.itens.len(),
            planned_total: round2(lot.planned_total()),
            is_today: lot.is_on(today),
        }
    }
}

/// Lots awaiting the chamber check, today's first; server order otherwise.
#[must_use]
pub fn queue_entries(lots: &[ProductionLot], today: NaiveDate) -> Vec<QueueEntry> {
    let mut entries: Vec<QueueEntry> = lots
        .iter()
        .filter(|lot| lot.status.awaits_cold_storage())
        .map(|lot| QueueEntry::from_lot(lot, today))
        .collect();
    entries.sort_by_key(|entry| !entry.is_today);
    entries
}

pub struct ColdStorageQueue {
    port: Arc<dyn ProductionPort>,
    today: Today,
    entries: RwLock<Vec<QueueEntry>>,
}

impl ColdStorageQueue {
    pub fn new(port: Arc<dyn ProductionPort>) -> Self {
        Self { port, today: system_today(), entries: RwLock::new(Vec::new()) }
    }

    #[must_use]
    pub fn with_today(mut self, today: Today) -> Self {
        self.today = today;
        self
    }

    #[instrument(skip(self))]
    pub async fn load(&self) -> usize {
        let entries = match self.port.list_lots().await {
            Ok(lots) => queue_entries(&lots, (self.today)()),
            Err(err) => {
                warn!(error = %err, "Failed to load cold-storage queue");
                Vec::new()
            }
        };
        let count = entries.len();
        *self.entries.write() = entries;
        count
    }

    #[must_use]
    pub fn entries(&self) -> Vec<QueueEntry> {
        self.entries.read().clone()
    }
}
