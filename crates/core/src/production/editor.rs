//! Production editor
//!
//! Edits one lot: its product lines, the counts typed on the production
//! floor, finalization and the lot's material list.

use std::sync::Arc;

use marops_domain::{
    EditingConfig, ItemCountField, LineStatus, LotStatus, MarOpsError, MaterialLine,
    NewProductionItem, ProductionItem, ProductionLot, RecordId, Result, StockRecord,
};
use parking_lot::RwLock;
use tracing::{info, instrument, warn};

use super::materials::MaterialListDraft;
use super::ports::ProductionPort;
use super::writers::ItemCountWriter;
use crate::adjustment::{FieldDebouncer, SaveFeedback};
use crate::stock::ports::StockPort;

/// Render-ready product line.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemView {
    pub id: RecordId,
    pub produto: RecordId,
    pub produto_nome: String,
    pub planned: f64,
    pub produced: f64,
    pub chamber_count: f64,
    pub status: Option<LineStatus>,
    pub feedback: SaveFeedback,
}

pub struct ProductionEditor {
    port: Arc<dyn ProductionPort>,
    stock: Arc<dyn StockPort>,
    lot_id: RecordId,
    lot: RwLock<Option<ProductionLot>>,
    catalogue: RwLock<Vec<StockRecord>>,
    materials: RwLock<Vec<MaterialLine>>,
    produced: FieldDebouncer,
}

impl ProductionEditor {
    pub fn new(
        port: Arc<dyn ProductionPort>,
        stock: Arc<dyn StockPort>,
        lot_id: RecordId,
        editing: &EditingConfig,
    ) -> Self {
        let produced = FieldDebouncer::new(
            Arc::new(ItemCountWriter::new(port.clone())),
            ItemCountField::Produced,
            editing.typed_quiet(),
            editing.saved_feedback(),
        );
        Self {
            port,
            stock,
            lot_id,
            lot: RwLock::new(None),
            catalogue: RwLock::new(Vec::new()),
            materials: RwLock::new(Vec::new()),
            produced,
        }
    }

    #[must_use]
    pub const fn lot_id(&self) -> &RecordId {
        &self.lot_id
    }

    /// Load the lot and the product catalogue in parallel, then the material
    /// list. Each failure is logged and leaves its part empty.
    ///
    /// Returns whether the lot itself could be loaded.
    #[instrument(skip(self), fields(lot = %self.lot_id))]
    pub async fn load(&self) -> bool {
        let (lot, products) =
            futures::join!(self.port.get_lot(&self.lot_id), self.stock.list_products());

        let loaded = match lot {
            Ok(lot) => {
                *self.lot.write() = Some(lot);
                true
            }
            Err(err) => {
                warn!(error = %err, "Failed to load production lot");
                *self.lot.write() = None;
                false
            }
        };
        *self.catalogue.write() = products.unwrap_or_else(|err| {
            warn!(error = %err, "Failed to load product catalogue");
            Vec::new()
        });

        self.load_materials().await;
        loaded
    }

    /// Reload the material list; a missing list reads as empty.
    pub async fn load_materials(&self) -> usize {
        let lines = self.port.material_list(&self.lot_id).await.unwrap_or_else(|err| {
            warn!(error = %err, "Failed to load material list");
            Vec::new()
        });
        let count = lines.len();
        *self.materials.write() = lines;
        count
    }

    #[must_use]
    pub fn lot(&self) -> Option<ProductionLot> {
        self.lot.read().clone()
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.lot.read().as_ref().is_some_and(ProductionLot::is_locked)
    }

    #[must_use]
    pub fn catalogue(&self) -> Vec<StockRecord> {
        self.catalogue.read().clone()
    }

    #[must_use]
    pub fn materials(&self) -> Vec<MaterialLine> {
        self.materials.read().clone()
    }

    /// Product lines with locally typed counts and save feedback applied.
    #[must_use]
    pub fn items(&self) -> Vec<ItemView> {
        let lot = self.lot.read();
        let Some(lot) = lot.as_ref() else {
            return Vec::new();
        };
        lot.itens
            .iter()
            .map(|item| ItemView {
                id: item.id.clone(),
                produto: item.produto.clone(),
                produto_nome: item.produto_nome.clone(),
                planned: item.quantidade_esperada,
                produced: self
                    .produced
                    .value(&item.id)
                    .unwrap_or(item.quantidade_conferida_producao),
                chamber_count: item.quantidade_conferida_camara,
                status: self.produced.status(&item.id).or(item.status),
                feedback: self.produced.feedback(&item.id),
            })
            .collect()
    }

    /// Add a product line with its planned quantity.
    ///
    /// # Errors
    /// - `Locked` for a finalized lot
    /// - `InvalidInput` when product or quantity is missing, or the product
    ///   is already in the lot
    /// - `NotFound` when the product is not in the catalogue
    /// - backend errors from the create call
    #[instrument(skip(self), fields(lot = %self.lot_id))]
    pub async fn add_item(
        &self,
        produto: Option<&RecordId>,
        planned: Option<f64>,
    ) -> Result<RecordId> {
        self.ensure_editable()?;
        let planned = planned.filter(|q| q.is_finite() && *q > 0.0);
        let (Some(produto), Some(planned)) = (produto, planned) else {
            return Err(MarOpsError::InvalidInput("select a product and a quantity".into()));
        };
        let product = self
            .catalogue
            .read()
            .iter()
            .find(|p| &p.id == produto)
            .cloned()
            .ok_or_else(|| MarOpsError::NotFound(format!("product {produto}")))?;
        let duplicate = self
            .lot
            .read()
            .as_ref()
            .is_some_and(|lot| lot.itens.iter().any(|i| &i.produto == produto));
        if duplicate {
            return Err(MarOpsError::InvalidInput(format!("{} is already in this lot", product.nome)));
        }

        let request = NewProductionItem::planned(self.lot_id.clone(), product.id.clone(), planned);
        let id = self.port.add_item(&request).await?;
        info!(item = %id, product = %product.id, planned, "Production item added");

        if let Some(lot) = self.lot.write().as_mut() {
            lot.itens.push(ProductionItem {
                id: id.clone(),
                produto: product.id,
                produto_nome: product.nome,
                quantidade_esperada: planned,
                quantidade_conferida_producao: 0.0,
                quantidade_conferida_camara: 0.0,
                status: Some(LineStatus::Pending),
            });
        }
        Ok(id)
    }

    /// Remove a product line locally and delete it in the background; a
    /// failed delete is only logged.
    ///
    /// # Errors
    /// `Locked` for a finalized lot, `NotFound` for an unknown item.
    pub fn remove_item(&self, item: &RecordId) -> Result<()> {
        self.ensure_editable()?;
        {
            let mut lot = self.lot.write();
            let lot = lot.as_mut().ok_or_else(|| MarOpsError::NotFound(format!("item {item}")))?;
            let before = lot.itens.len();
            lot.itens.retain(|i| &i.id != item);
            if lot.itens.len() == before {
                return Err(MarOpsError::NotFound(format!("item {item}")));
            }
        }
        self.produced.forget(item);

        let port = self.port.clone();
        let item = item.clone();
        tokio::spawn(async move {
            if let Err(err) = port.delete_item(&item).await {
                warn!(item = %item, error = %err, "Failed to delete production item");
            }
        });
        Ok(())
    }

    /// Type the produced count of an item; saved after the quiet window.
    ///
    /// # Errors
    /// `Locked` for a finalized lot, `NotFound` for an unknown item,
    /// `InvalidInput` for a negative value.
    pub fn set_produced(&self, item: &RecordId, value: f64) -> Result<()> {
        self.ensure_editable()?;
        let known = self
            .lot
            .read()
            .as_ref()
            .is_some_and(|lot| lot.itens.iter().any(|i| &i.id == item));
        if !known {
            return Err(MarOpsError::NotFound(format!("item {item}")));
        }
        self.produced.set(item, value)
    }

    /// Finalize the lot; it is read-only afterwards.
    ///
    /// # Errors
    /// `Locked` when already finalized, or the backend error.
    #[instrument(skip(self), fields(lot = %self.lot_id))]
    pub async fn finalize(&self) -> Result<()> {
        self.ensure_editable()?;
        self.port.finalize_lot(&self.lot_id).await?;
        if let Some(lot) = self.lot.write().as_mut() {
            lot.status = LotStatus::Finalized;
        }
        info!("Production lot finalized");
        Ok(())
    }

    /// Start editing the material list, with the insumo catalogue loaded.
    pub async fn open_material_draft(&self) -> MaterialListDraft {
        let mut draft = MaterialListDraft::from_lines(&self.materials.read());
        draft.load_available(self.stock.as_ref()).await;
        draft
    }

    /// Save a material list draft and adopt the list the server returns.
    ///
    /// # Errors
    /// `Locked` for a finalized lot, `InvalidInput` for a draft without a
    /// positive requirement, or the backend error.
    #[instrument(skip(self, draft), fields(lot = %self.lot_id))]
    pub async fn save_material_list(&self, draft: &MaterialListDraft) -> Result<()> {
        self.ensure_editable()?;
        let requests = draft.requests()?;
        let saved = self.port.save_material_list(&self.lot_id, &requests).await?;
        info!(lines = saved.len(), created = draft.is_new_list(), "Material list saved");
        *self.materials.write() = saved;
        Ok(())
    }

    /// Cancel pending typed saves; call when the screen closes.
    pub fn close(&self) -> usize {
        self.produced.discard()
    }

    fn ensure_editable(&self) -> Result<()> {
        if self.is_locked() {
            return Err(MarOpsError::Locked(format!("production lot {} is finalized", self.lot_id)));
        }
        Ok(())
    }
}
