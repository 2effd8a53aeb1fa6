//! Port interfaces for stock data and the local chart cache

use async_trait::async_trait;
use marops_domain::{Result, StockIntake, StockRecord};

use super::chart::CachedChart;

/// Trait for the stock endpoints
#[async_trait]
pub trait StockPort: Send + Sync {
    /// Raw materials (`GET /api/estoque/insumos/`)
    async fn list_insumos(&self) -> Result<Vec<StockRecord>>;

    /// Finished products (`GET /api/estoque/produtos/`)
    async fn list_products(&self) -> Result<Vec<StockRecord>>;

    /// Register an invoice's worth of raw materials
    /// (`POST /api/estoque/entrada/entrada-multipla/`)
    async fn register_intake(&self, intake: &StockIntake) -> Result<()>;
}

/// Trait for the client-local chart cache
#[async_trait]
pub trait ChartCachePort: Send + Sync {
    /// Stored entry under `key`, if any. Corrupt entries read as `None`.
    async fn load(&self, key: &str) -> Result<Option<CachedChart>>;

    /// Replace the entry under `key`.
    async fn store(&self, key: &str, entry: &CachedChart) -> Result<()>;
}
