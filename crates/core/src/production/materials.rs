//! Editable material list of a production lot
//!
//! The draft is edited locally and sent in one `gerar-lista-insumos` call.

use marops_domain::constants::DEFAULT_REQUIRED_QUANTITY;
use marops_domain::{MarOpsError, MaterialLine, MaterialRequest, RecordId, Result, StockRecord};
use tracing::warn;

use crate::stock::ports::StockPort;

#[derive(Debug, Clone, PartialEq)]
pub struct DraftLine {
    pub insumo_id: RecordId,
    pub nome: String,
    pub unidade_medida: Option<String>,
    pub quantidade_necessaria: f64,
    /// Read-only here; maintained by the cold-storage check-in.
    pub quantidade_recebida: f64,
}

impl From<&MaterialLine> for DraftLine {
    fn from(line: &MaterialLine) -> Self {
        Self {
            insumo_id: line.insumo_id.clone(),
            nome: line.nome.clone(),
            unidade_medida: line.unidade_medida.clone(),
            quantidade_necessaria: line.quantidade_necessaria,
            quantidade_recebida: line.quantidade_recebida,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialListDraft {
    lines: Vec<DraftLine>,
    available: Vec<StockRecord>,
    existed: bool,
}

impl MaterialListDraft {
    #[must_use]
    pub fn from_lines(lines: &[MaterialLine]) -> Self {
        Self {
            lines: lines.iter().map(DraftLine::from).collect(),
            available: Vec::new(),
            existed: !lines.is_empty(),
        }
    }

    /// Load the insumo catalogue offered for selection. Failures leave the
    /// catalogue empty.
    pub async fn load_available(&mut self, stock: &dyn StockPort) -> usize {
        match stock.list_insumos().await {
            Ok(insumos) => self.available = insumos,
            Err(err) => {
                warn!(error = %err, "Failed to load available insumos");
                self.available.clear();
            }
        }
        self.available.len()
    }

    #[must_use]
    pub fn lines(&self) -> &[DraftLine] {
        &self.lines
    }

    /// Whether saving creates the list rather than replacing it.
    #[must_use]
    pub const fn is_new_list(&self) -> bool {
        !self.existed
    }

    /// Catalogue entries not yet in the draft.
    #[must_use]
    pub fn choices(&self) -> Vec<&StockRecord> {
        self.available
            .iter()
            .filter(|record| !self.lines.iter().any(|l| l.insumo_id == record.id))
            .collect()
    }

    /// Add an insumo from the catalogue with the default requirement.
    ///
    /// # Errors
    /// `NotFound` when the insumo is not in the catalogue, `InvalidInput` when
    /// it is already listed.
    pub fn add(&mut self, insumo_id: &RecordId) -> Result<()> {
        if self.lines.iter().any(|l| &l.insumo_id == insumo_id) {
            return Err(MarOpsError::InvalidInput(format!("insumo {insumo_id} is already listed")));
        }
        let record = self
            .available
            .iter()
            .find(|r| &r.id == insumo_id)
            .ok_or_else(|| MarOpsError::NotFound(format!("insumo {insumo_id}")))?;
        self.lines.push(DraftLine {
            insumo_id: record.id.clone(),
            nome: record.nome.clone(),
            unidade_medida: record.unidade_medida.clone(),
            quantidade_necessaria: DEFAULT_REQUIRED_QUANTITY,
            quantidade_recebida: 0.0,
        });
        Ok(())
    }

    /// # Errors
    /// `InvalidInput` for negative or non-finite values, `NotFound` for an
    /// unlisted insumo.
    pub fn set_required(&mut self, insumo_id: &RecordId, value: f64) -> Result<()> {
        if !value.is_finite() || value < 0.0 {
            return Err(MarOpsError::InvalidInput(format!("invalid required quantity: {value}")));
        }
        let line = self
            .lines
            .iter_mut()
            .find(|l| &l.insumo_id == insumo_id)
            .ok_or_else(|| MarOpsError::NotFound(format!("insumo {insumo_id}")))?;
        line.quantidade_necessaria = value;
        Ok(())
    }

    pub fn remove(&mut self, insumo_id: &RecordId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| &l.insumo_id != insumo_id);
        self.lines.len() != before
    }

    /// Payload for saving; lines without a positive requirement are left out.
    ///
    /// # Errors
    /// `InvalidInput` when no line has a positive requirement.
    pub fn requests(&self) -> Result<Vec<MaterialRequest>> {
        let requests: Vec<MaterialRequest> = self
            .lines
            .iter()
            .filter(|l| l.quantidade_necessaria > 0.0)
            .map(|l| MaterialRequest {
                insumo_id: l.insumo_id.clone(),
                quantidade_necessaria: l.quantidade_necessaria,
                quantidade_recebida: Some(l.quantidade_recebida),
            })
            .collect();
        if requests.is_empty() {
            return Err(MarOpsError::InvalidInput(
                "the list needs at least one insumo with a required quantity above zero".into(),
            ));
        }
        Ok(requests)
    }
}
