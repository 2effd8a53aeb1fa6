//! Cold-storage editor
//!
//! Chamber counts of one lot are typed and saved after a quiet window. The
//! material panel supplies insumos with increment buttons through the
//! quantity-adjustment protocol.

use std::sync::Arc;

use marops_domain::{
    EditingConfig, ItemCountField, LineStatus, MarOpsError, MaterialRequest, ProductionLot,
    RecordId, Result,
};
use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::adjustment::{AdjustableLine, FieldDebouncer, LineView, QuantityAdjuster, SaveFeedback};
use crate::production::ports::ProductionPort;
use crate::production::writers::{ItemCountWriter, MaterialSupplyWriter};

#[derive(Debug, Clone, PartialEq)]
pub struct ChamberItemView {
    pub id: RecordId,
    pub produto_nome: String,
    pub planned: f64,
    pub produced: f64,
    pub chamber_count: f64,
    pub status: Option<LineStatus>,
    pub feedback: SaveFeedback,
}

pub struct ColdStorageEditor {
    port: Arc<dyn ProductionPort>,
    lot_id: RecordId,
    lot: RwLock<Option<ProductionLot>>,
    chamber: FieldDebouncer,
    materials: QuantityAdjuster,
}

impl ColdStorageEditor {
    pub fn new(port: Arc<dyn ProductionPort>, lot_id: RecordId, editing: &EditingConfig) -> Self {
        let chamber = FieldDebouncer::new(
            Arc::new(ItemCountWriter::new(port.clone())),
            ItemCountField::ChamberCount,
            editing.typed_quiet(),
            editing.saved_feedback(),
        );
        let materials = QuantityAdjuster::new(
            Arc::new(MaterialSupplyWriter::new(port.clone(), lot_id.clone())),
            editing.increment_quiet(),
        );
        Self { port, lot_id, lot: RwLock::new(None), chamber, materials }
    }

    #[must_use]
    pub const fn lot_id(&self) -> &RecordId {
        &self.lot_id
    }

    /// Load the lot. Returns whether it could be loaded.
    #[instrument(skip(self), fields(lot = %self.lot_id))]
    pub async fn load(&self) -> bool {
        match self.port.get_lot(&self.lot_id).await {
            Ok(lot) => {
                self.materials.set_locked(lot.is_locked());
                *self.lot.write() = Some(lot);
                true
            }
            Err(err) => {
                warn!(error = %err, "Failed to load lot for cold storage");
                *self.lot.write() = None;
                false
            }
        }
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
    pub fn items(&self) -> Vec<ChamberItemView> {
        let lot = self.lot.read();
        let Some(lot) = lot.as_ref() else {
            return Vec::new();
        };
        lot.itens
            .iter()
            .map(|item| ChamberItemView {
                id: item.id.clone(),
                produto_nome: item.produto_nome.clone(),
                planned: item.quantidade_esperada,
                produced: item.quantidade_conferida_producao,
                chamber_count: self
                    .chamber
                    .value(&item.id)
                    .unwrap_or(item.quantidade_conferida_camara),
                status: self.chamber.status(&item.id).or(item.status),
                feedback: self.chamber.feedback(&item.id),
            })
            .collect()
    }

    /// Type the chamber count of an item; saved after the quiet window.
    ///
    /// # Errors
    /// `Locked` for a finalized lot, `NotFound` for an unknown item,
    /// `InvalidInput` for a negative value.
    pub fn set_chamber_count(&self, item: &RecordId, value: f64) -> Result<()> {
        self.ensure_editable()?;
        let known = self
            .lot
            .read()
            .as_ref()
            .is_some_and(|lot| lot.itens.iter().any(|i| &i.id == item));
        if !known {
            return Err(MarOpsError::NotFound(format!("item {item}")));
        }
        self.chamber.set(item, value)
    }

    /// Open the material panel: load the lot's material list into the
    /// adjuster. A missing list reads as empty.
    #[instrument(skip(self), fields(lot = %self.lot_id))]
    pub async fn open_materials(&self) -> usize {
        let lines = self.port.material_list(&self.lot_id).await.unwrap_or_else(|err| {
            warn!(error = %err, "Failed to load material list");
            Vec::new()
        });
        let count = lines.len();
        self.materials.set_locked(self.is_locked());
        self.materials.load(lines.into_iter().map(AdjustableLine::from));
        count
    }

    #[must_use]
    pub fn materials(&self) -> Vec<LineView> {
        self.materials.lines()
    }

    /// Revision counter of the material panel.
    #[must_use]
    pub fn subscribe_materials(&self) -> watch::Receiver<u64> {
        self.materials.subscribe()
    }

    /// Revision counter of the chamber counts.
    #[must_use]
    pub fn subscribe_items(&self) -> watch::Receiver<u64> {
        self.chamber.subscribe()
    }

    /// Supply (or take back) some of an insumo. Returns the preview value.
    ///
    /// # Errors
    /// See [`QuantityAdjuster::adjust`].
    pub fn adjust_material(&self, insumo: &RecordId, delta: f64) -> Result<f64> {
        self.ensure_editable()?;
        self.materials.adjust(insumo, delta)
    }

    /// Close the material panel, dropping unsent adjustments.
    pub fn close_materials(&self) -> usize {
        self.materials.discard_all_pending()
    }

    /// Replace the lot's material list with the current requirements, then
    /// reload it. Received quantities are left to the supply endpoint.
    ///
    /// # Errors
    /// `Locked` for a finalized lot, `InvalidInput` for an empty list, or the
    /// backend error.
    #[instrument(skip(self), fields(lot = %self.lot_id))]
    pub async fn save_material_list(&self) -> Result<()> {
        self.ensure_editable()?;
        let requests: Vec<MaterialRequest> = self
            .materials
            .lines()
            .into_iter()
            .map(|line| MaterialRequest {
                insumo_id: line.id,
                quantidade_necessaria: line.required,
                quantidade_recebida: None,
            })
            .collect();
        if requests.is_empty() {
            return Err(MarOpsError::InvalidInput("material list is empty".into()));
        }
        self.port.save_material_list(&self.lot_id, &requests).await?;
        info!(lines = requests.len(), "Material list replaced from cold storage");
        self.open_materials().await;
        Ok(())
    }

    /// Cancel pending typed saves and material adjustments; call when the
    /// screen closes.
    pub fn close(&self) -> usize {
        self.chamber.discard() + self.materials.discard_all_pending()
    }

    fn ensure_editable(&self) -> Result<()> {
        if self.is_locked() {
            return Err(MarOpsError::Locked(format!("production lot {} is finalized", self.lot_id)));
        }
        Ok(())
    }
}
