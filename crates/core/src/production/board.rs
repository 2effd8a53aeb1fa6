//! Production board
//!
//! Lists the lots the production floor cares about: today's lots and any lot
//! not finalized yet. Also hosts lot creation.

use std::sync::Arc;

use chrono::NaiveDate;
use marops_domain::{NewProductionLot, ProductionLot, Result};
use parking_lot::RwLock;
use tracing::{info, instrument, warn};

use super::ports::ProductionPort;
use crate::clock::{system_today, Today};

/// Lots dated `today` or not finalized, in server order.
#[must_use]
pub fn visible_lots(lots: Vec<ProductionLot>, today: NaiveDate) -> Vec<ProductionLot> {
    lots.into_iter().filter(|lot| lot.is_on(today) || !lot.status.is_locked()).collect()
}

pub struct ProductionBoard {
    port: Arc<dyn ProductionPort>,
    today: Today,
    lots: RwLock<Vec<ProductionLot>>,
}

impl ProductionBoard {
    pub fn new(port: Arc<dyn ProductionPort>) -> Self {
        Self { port, today: system_today(), lots: RwLock::new(Vec::new()) }
    }

    #[must_use]
    pub fn with_today(mut self, today: Today) -> Self {
        self.today = today;
        self
    }

    /// Reload the board. Failures leave an empty board.
    #[instrument(skip(self))]
    pub async fn load(&self) -> usize {
        let lots = match self.port.list_lots().await {
            Ok(all) => visible_lots(all, (self.today)()),
            Err(err) => {
                warn!(error = %err, "Failed to load production lots");
                Vec::new()
            }
        };
        let count = lots.len();
        *self.lots.write() = lots;
        count
    }

    #[must_use]
    pub fn lots(&self) -> Vec<ProductionLot> {
        self.lots.read().clone()
    }

    /// Whether a listed lot is still open.
    #[must_use]
    pub fn has_open_lot(&self) -> bool {
        self.lots.read().iter().any(|lot| !lot.is_locked())
    }

    /// Whether to offer starting a new lot.
    #[must_use]
    pub fn can_start_new(&self) -> bool {
        self.lots.read().is_empty() || !self.has_open_lot()
    }

    /// Open a lot dated today, then reload.
    ///
    /// # Errors
    /// Propagates the backend failure; the board is not reloaded then.
    #[instrument(skip(self))]
    pub async fn create_lot(&self, observacao: &str) -> Result<()> {
        let lot = NewProductionLot { data: (self.today)(), observacao: observacao.trim().to_string() };
        self.port.create_lot(&lot).await?;
        info!(date = %lot.data, "Production lot created");
        self.load().await;
        Ok(())
    }
}
