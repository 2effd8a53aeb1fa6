//! Integration tests for the stock overview, intake form and chart

mod support;

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use marops_core::stock::{StockChart, StockIntakeForm, StockOverview};
use marops_domain::constants::CHART_CACHE_KEY;
use marops_domain::{LotStatus, MarOpsError, RecordId};
use support::production::MockProductionPort;
use support::stock::{MockChartCache, MockStockPort};
use support::{lot, record};

#[tokio::test]
async fn overview_ranks_by_criticality() {
    let stock = Arc::new(MockStockPort::new(
        vec![
            record(1, "Farinha", 50.0, 100.0),
            record(2, "Óleo", 1.0, 10.0),
            record(3, "Sal", 0.0, 0.0),
            record(4, "Açúcar", 9.0, 10.0),
            record(5, "Fermento", 3.0, 10.0),
            record(6, "Ovos", 30.0, 10.0),
        ],
        vec![record(8, "Pastel", 2.0, 4.0)],
    ));
    let production = Arc::new(MockProductionPort::new(vec![
        lot(1, 3, LotStatus::Draft, vec![]),
        lot(2, 9, LotStatus::AwaitingCheck, vec![]),
        lot(3, 12, LotStatus::Finalized, vec![]),
    ]));
    let overview = StockOverview::new(stock, production);
    overview.load().await;

    let names: Vec<_> = overview.critical_insumos().into_iter().map(|r| r.nome).collect();
    assert_eq!(names, vec!["Sal", "Óleo", "Fermento", "Farinha", "Açúcar"]);
    assert_eq!(overview.critical_products().len(), 1);
    let lots: Vec<_> = overview.open_lots().into_iter().map(|l| l.id).collect();
    assert_eq!(lots, vec![RecordId::from(2), RecordId::from(1)]);
}

#[tokio::test]
async fn overview_panels_fail_independently() {
    let stock = Arc::new(MockStockPort::new(vec![record(1, "Farinha", 1.0, 2.0)], vec![]));
    stock.set_failing(true);
    let production = Arc::new(MockProductionPort::new(vec![lot(1, 3, LotStatus::Draft, vec![])]));
    let overview = StockOverview::new(stock, production);
    overview.load().await;

    assert!(overview.critical_insumos().is_empty());
    assert_eq!(overview.open_lots().len(), 1);
}

#[tokio::test]
async fn intake_requires_nf_and_complete_rows() {
    let stock = Arc::new(MockStockPort::new(vec![record(1, "Farinha", 1.0, 2.0)], vec![]));
    let form = StockIntakeForm::new(stock.clone());
    assert_eq!(form.load_available().await, 1);

    assert!(matches!(form.validate(), Err(MarOpsError::InvalidInput(_))));
    form.set_nf("  ");
    assert!(matches!(form.validate(), Err(MarOpsError::InvalidInput(_))));
    form.set_nf("NF-123");
    assert!(matches!(form.validate(), Err(MarOpsError::InvalidInput(_))));

    let row = form.add_row();
    assert!(matches!(form.validate(), Err(MarOpsError::InvalidInput(_))));
    form.set_row_insumo(row, Some(RecordId::from(1))).unwrap();
    form.set_row_quantity(row, "abc").unwrap();
    assert!(matches!(form.validate(), Err(MarOpsError::InvalidInput(_))));
    assert!(matches!(form.set_row_quantity(4, "1"), Err(MarOpsError::NotFound(_))));

    form.set_row_quantity(row, "12,5").unwrap();
    let intake = form.validate().unwrap();
    assert_eq!(intake.nf_numero, "NF-123");
    assert_eq!(intake.insumos[0].id, RecordId::from(1));
    assert_eq!(intake.insumos[0].quantidade, 12.5);
    assert!(stock.intakes().is_empty());
}

#[tokio::test]
async fn intake_submit_posts_and_clears() {
    let stock = Arc::new(MockStockPort::new(vec![record(1, "Farinha", 1.0, 2.0)], vec![]));
    let form = StockIntakeForm::new(stock.clone());
    form.set_nf("4411");
    let first = form.add_row();
    form.set_row_insumo(first, Some(RecordId::from(1))).unwrap();
    form.set_row_quantity(first, "3").unwrap();
    let extra = form.add_row();
    assert!(form.remove_row(extra));
    assert!(!form.remove_row(extra));

    form.submit().await.unwrap();

    let intakes = stock.intakes();
    assert_eq!(intakes.len(), 1);
    assert_eq!(intakes[0].insumos.len(), 1);
    assert!(form.nf_numero().is_empty());
    assert!(form.rows().is_empty());
}

#[tokio::test]
async fn failed_intake_keeps_the_form() {
    let stock = Arc::new(MockStockPort::new(vec![], vec![]));
    stock.set_failing(true);
    let form = StockIntakeForm::new(stock);
    form.set_nf("4411");
    let row = form.add_row();
    form.set_row_insumo(row, Some(RecordId::from(1))).unwrap();
    form.set_row_quantity(row, "3").unwrap();

    assert!(matches!(form.submit().await, Err(MarOpsError::Network(_))));
    assert_eq!(form.nf_numero(), "4411");
    assert_eq!(form.rows().len(), 1);
}

fn chart_with_clock(
    stock: &Arc<MockStockPort>,
    cache: &Arc<MockChartCache>,
    now: &Arc<AtomicI64>,
) -> StockChart {
    let clock = now.clone();
    StockChart::new(stock.clone(), cache.clone(), Duration::from_secs(300))
        .with_clock(Arc::new(move || clock.load(Ordering::SeqCst)))
}

#[tokio::test]
async fn chart_is_served_from_cache_while_fresh() {
    let stock = Arc::new(MockStockPort::new(
        vec![],
        vec![record(8, "Pastel", 7.0, 0.0), record(9, "Coxinha", 2.0, 0.0)],
    ));
    let cache = Arc::new(MockChartCache::default());
    let now = Arc::new(AtomicI64::new(1_700_000_000_000));
    let chart = chart_with_clock(&stock, &cache, &now);

    assert_eq!(chart.refresh(false).await, 2);
    assert_eq!(chart.points()[0].name, "C9 - Coxinha");
    assert_eq!(cache.entry(CHART_CACHE_KEY).unwrap().ts, 1_700_000_000_000);

    stock.set_products(vec![record(10, "Empada", 1.0, 0.0)]);
    now.fetch_add(299_000, Ordering::SeqCst);
    assert_eq!(chart.refresh(false).await, 2);
    assert_eq!(stock.product_fetches(), 1);

    assert_eq!(chart.refresh(true).await, 1);
    assert_eq!(stock.product_fetches(), 2);
    assert_eq!(chart.points()[0].name, "C10 - Empada");
}

#[tokio::test]
async fn stale_cache_is_refetched_and_failures_keep_points() {
    let stock = Arc::new(MockStockPort::new(vec![], vec![record(8, "Pastel", 7.0, 0.0)]));
    let cache = Arc::new(MockChartCache::default());
    let now = Arc::new(AtomicI64::new(1_000_000));
    let chart = chart_with_clock(&stock, &cache, &now);

    chart.refresh(false).await;
    now.fetch_add(300_000, Ordering::SeqCst);
    stock.set_failing(true);

    assert_eq!(chart.refresh(false).await, 1);
    assert_eq!(stock.product_fetches(), 2);
    assert_eq!(chart.points()[0].estoque, 7.0);
}
