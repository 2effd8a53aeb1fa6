//! In-memory `StockPort` and `ChartCachePort`

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use marops_core::stock::ports::{ChartCachePort, StockPort};
use marops_core::stock::CachedChart;
use marops_domain::{MarOpsError, Result as DomainResult, StockIntake, StockRecord};

#[derive(Default)]
pub struct MockStockPort {
    insumos: Mutex<Vec<StockRecord>>,
    products: Mutex<Vec<StockRecord>>,
    intakes: Mutex<Vec<StockIntake>>,
    product_fetches: AtomicUsize,
    failing: AtomicBool,
}

impl MockStockPort {
    pub fn new(insumos: Vec<StockRecord>, products: Vec<StockRecord>) -> Self {
        Self { insumos: Mutex::new(insumos), products: Mutex::new(products), ..Self::default() }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_products(&self, products: Vec<StockRecord>) {
        *self.products.lock().unwrap() = products;
    }

    pub fn intakes(&self) -> Vec<StockIntake> {
        self.intakes.lock().unwrap().clone()
    }

    pub fn product_fetches(&self) -> usize {
        self.product_fetches.load(Ordering::SeqCst)
    }

    fn check(&self) -> DomainResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MarOpsError::Network("backend unreachable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl StockPort for MockStockPort {
    async fn list_insumos(&self) -> DomainResult<Vec<StockRecord>> {
        self.check()?;
        Ok(self.insumos.lock().unwrap().clone())
    }

    async fn list_products(&self) -> DomainResult<Vec<StockRecord>> {
        self.product_fetches.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.products.lock().unwrap().clone())
    }

    async fn register_intake(&self, intake: &StockIntake) -> DomainResult<()> {
        self.check()?;
        self.intakes.lock().unwrap().push(intake.clone());
        Ok(())
    }
}

/// Chart cache held in a map.
#[derive(Default)]
pub struct MockChartCache {
    entries: Mutex<HashMap<String, CachedChart>>,
}

impl MockChartCache {
    pub fn entry(&self, key: &str) -> Option<CachedChart> {
        self.entries.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl ChartCachePort for MockChartCache {
    async fn load(&self, key: &str) -> DomainResult<Option<CachedChart>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn store(&self, key: &str, entry: &CachedChart) -> DomainResult<()> {
        self.entries.lock().unwrap().insert(key.to_string(), entry.clone());
        Ok(())
    }
}
