//! Stock overview
//!
//! Most critical insumos and products, plus the lots still open.

use std::cmp::Reverse;
use std::sync::Arc;

use marops_domain::constants::OVERVIEW_TOP_N;
use marops_domain::{ProductionLot, StockRecord};
use parking_lot::RwLock;
use tracing::{instrument, warn};

use super::ports::StockPort;
use crate::production::ports::ProductionPort;

/// The `top` records with the lowest current/ideal ratio, ascending.
/// Ties keep server order.
#[must_use]
pub fn most_critical(mut records: Vec<StockRecord>, top: usize) -> Vec<StockRecord> {
    records.sort_by(|a, b| a.criticality().total_cmp(&b.criticality()));
    records.truncate(top);
    records
}

/// Lots not finalized, newest date first.
#[must_use]
pub fn open_lots(lots: Vec<ProductionLot>) -> Vec<ProductionLot> {
    let mut open: Vec<_> = lots.into_iter().filter(|lot| !lot.is_locked()).collect();
    open.sort_by_key(|lot| Reverse(lot.data));
    open
}

#[derive(Debug, Clone, Default)]
struct Snapshot {
    insumos: Vec<StockRecord>,
    products: Vec<StockRecord>,
    lots: Vec<ProductionLot>,
}

pub struct StockOverview {
    stock: Arc<dyn StockPort>,
    production: Arc<dyn ProductionPort>,
    snapshot: RwLock<Snapshot>,
}

impl StockOverview {
    pub fn new(stock: Arc<dyn StockPort>, production: Arc<dyn ProductionPort>) -> Self {
        Self { stock, production, snapshot: RwLock::new(Snapshot::default()) }
    }

    /// Load the three panels in parallel; a failing panel renders empty.
    #[instrument(skip(self))]
    pub async fn load(&self) {
        let (insumos, products, lots) = futures::join!(
            self.stock.list_insumos(),
            self.stock.list_products(),
            self.production.list_lots(),
        );

        let insumos = insumos.unwrap_or_else(|err| {
            warn!(error = %err, "Failed to load insumos for overview");
            Vec::new()
        });
        let products = products.unwrap_or_else(|err| {
            warn!(error = %err, "Failed to load products for overview");
            Vec::new()
        });
        let lots = lots.unwrap_or_else(|err| {
            warn!(error = %err, "Failed to load lots for overview");
            Vec::new()
        });

        *self.snapshot.write() = Snapshot {
            insumos: most_critical(insumos, OVERVIEW_TOP_N),
            products: most_critical(products, OVERVIEW_TOP_N),
            lots: open_lots(lots),
        };
    }

    #[must_use]
    pub fn critical_insumos(&self) -> Vec<StockRecord> {
        self.snapshot.read().insumos.clone()
    }

    #[must_use]
    pub fn critical_products(&self) -> Vec<StockRecord> {
        self.snapshot.read().products.clone()
    }

    #[must_use]
    pub fn open_lots(&self) -> Vec<ProductionLot> {
        self.snapshot.read().lots.clone()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use marops_domain::{LotStatus, RecordId};

    use super::*;

    fn record(id: i64, atual: f64, ideal: f64) -> StockRecord {
        StockRecord {
            id: RecordId::from(id),
            nome: format!("Insumo {id}"),
            codigo: None,
            estoque_atual: atual,
            estoque_ideal: ideal,
            unidade_medida: None,
        }
    }

    fn lot(id: i64, day: u32, status: LotStatus) -> ProductionLot {
        ProductionLot {
            id: RecordId::from(id),
            data: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            status,
            itens: vec![],
            observacao: None,
        }
    }

    #[test]
    fn most_critical_sorts_by_ratio() {
        let records = vec![
            record(1, 10.0, 10.0),
            record(2, 1.0, 10.0),
            record(3, 0.0, 0.0),
            record(4, 5.0, 0.0),
            record(5, 4.0, 10.0),
            record(6, 9.0, 10.0),
        ];
        let ids: Vec<_> = most_critical(records, 5).into_iter().map(|r| r.id).collect();
        assert_eq!(
            ids,
            vec![RecordId::from(3), RecordId::from(2), RecordId::from(5), RecordId::from(6), RecordId::from(1)]
        );
    }

    #[test]
    fn ties_keep_server_order() {
        let records = vec![record(7, 0.0, 0.0), record(8, 0.0, 5.0)];
        let ids: Vec<_> = most_critical(records, 5).into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![RecordId::from(7), RecordId::from(8)]);
    }

    #[test]
    fn open_lots_newest_first() {
        let lots = vec![
            lot(1, 3, LotStatus::Draft),
            lot(2, 9, LotStatus::Finalized),
            lot(3, 7, LotStatus::AwaitingCheck),
        ];
        let ids: Vec<_> = open_lots(lots).into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![RecordId::from(3), RecordId::from(1)]);
    }
}
