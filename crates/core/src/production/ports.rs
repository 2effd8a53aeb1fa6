//! Port interfaces for production lots
//!
//! These traits define the boundaries between the screen controllers and
//! the backend gateway for everything under `/api/producao*`.

use async_trait::async_trait;
use marops_domain::{
    ItemCountField, LineStatus, MaterialLine, MaterialRequest, NewProductionItem,
    NewProductionLot, ProductionLot, RecordId, Result,
};

/// Trait for production lot reads and writes
#[async_trait]
pub trait ProductionPort: Send + Sync {
    /// All lots (`GET /api/producao/`)
    async fn list_lots(&self) -> Result<Vec<ProductionLot>>;

    /// One lot with its items (`GET /api/producao/{id}/`)
    async fn get_lot(&self, id: &RecordId) -> Result<ProductionLot>;

    /// Open a new lot (`POST /api/producao/`)
    async fn create_lot(&self, lot: &NewProductionLot) -> Result<()>;

    /// Close a lot for good (`POST /api/producao/{id}/finalizar/`)
    async fn finalize_lot(&self, id: &RecordId) -> Result<()>;

    /// Add a product line; returns the new item id (`POST /api/producao-itens/`)
    async fn add_item(&self, item: &NewProductionItem) -> Result<RecordId>;

    /// Save an absolute count (`PATCH /api/producao-itens/{id}/`)
    async fn update_item_count(
        &self,
        item: &RecordId,
        field: ItemCountField,
        value: f64,
    ) -> Result<Option<LineStatus>>;

    /// Remove a product line (`DELETE /api/producao-itens/{id}/`)
    async fn delete_item(&self, item: &RecordId) -> Result<()>;

    /// Material list of a lot; empty when none was generated yet
    /// (`GET /api/producao/{id}/lista-insumos/`)
    async fn material_list(&self, lot: &RecordId) -> Result<Vec<MaterialLine>>;

    /// Create or replace the material list
    /// (`POST /api/producao/{id}/gerar-lista-insumos/`)
    async fn save_material_list(
        &self,
        lot: &RecordId,
        lines: &[MaterialRequest],
    ) -> Result<Vec<MaterialLine>>;

    /// Record a signed delivered quantity; returns the confirmed total when
    /// reported (`POST /api/producao/{id}/insumo/{insumo_id}/fornecer/`)
    async fn supply_material(
        &self,
        lot: &RecordId,
        insumo: &RecordId,
        quantidade: f64,
    ) -> Result<Option<f64>>;
}
