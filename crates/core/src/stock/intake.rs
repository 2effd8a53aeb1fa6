//! Stock intake form
//!
//! One invoice (NF) with any number of `{insumo, quantidade}` rows, posted in
//! a single call.

use std::sync::Arc;

use marops_domain::utils::lenient::parse_decimal;
use marops_domain::{IntakeLine, MarOpsError, RecordId, Result, StockIntake, StockRecord};
use parking_lot::RwLock;
use tracing::{info, instrument, warn};

use super::ports::StockPort;

/// One row as typed; the quantity stays raw text until validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntakeRow {
    pub insumo: Option<RecordId>,
    pub quantidade: String,
}

#[derive(Debug, Default)]
struct FormState {
    nf_numero: String,
    rows: Vec<IntakeRow>,
    available: Vec<StockRecord>,
}

pub struct StockIntakeForm {
    stock: Arc<dyn StockPort>,
    state: RwLock<FormState>,
}

impl StockIntakeForm {
    pub fn new(stock: Arc<dyn StockPort>) -> Self {
        Self { stock, state: RwLock::new(FormState::default()) }
    }

    /// Load the insumos offered in the row pickers. Failures leave the
    /// pickers empty.
    pub async fn load_available(&self) -> usize {
        let insumos = self.stock.list_insumos().await.unwrap_or_else(|err| {
            warn!(error = %err, "Failed to load insumos for intake");
            Vec::new()
        });
        let count = insumos.len();
        self.state.write().available = insumos;
        count
    }

    #[must_use]
    pub fn available(&self) -> Vec<StockRecord> {
        self.state.read().available.clone()
    }

    #[must_use]
    pub fn nf_numero(&self) -> String {
        self.state.read().nf_numero.clone()
    }

    #[must_use]
    pub fn rows(&self) -> Vec<IntakeRow> {
        self.state.read().rows.clone()
    }

    pub fn set_nf(&self, nf_numero: &str) {
        self.state.write().nf_numero = nf_numero.to_string();
    }

    /// Append an empty row and return its index.
    pub fn add_row(&self) -> usize {
        let mut state = self.state.write();
        state.rows.push(IntakeRow::default());
        state.rows.len() - 1
    }

    /// # Errors
    /// `NotFound` for an index past the last row.
    pub fn set_row_insumo(&self, index: usize, insumo: Option<RecordId>) -> Result<()> {
        self.with_row(index, |row| row.insumo = insumo)
    }

    /// # Errors
    /// `NotFound` for an index past the last row.
    pub fn set_row_quantity(&self, index: usize, quantidade: &str) -> Result<()> {
        self.with_row(index, |row| row.quantidade = quantidade.to_string())
    }

    /// Remove a row; later rows shift up.
    pub fn remove_row(&self, index: usize) -> bool {
        let mut state = self.state.write();
        if index < state.rows.len() {
            state.rows.remove(index);
            true
        } else {
            false
        }
    }

    /// Build the request body from the current form.
    ///
    /// # Errors
    /// `InvalidInput` when the NF is blank, there are no rows, or a row lacks
    /// an insumo or a positive numeric quantity.
    pub fn validate(&self) -> Result<StockIntake> {
        let state = self.state.read();
        let nf_numero = state.nf_numero.trim();
        if nf_numero.is_empty() {
            return Err(MarOpsError::InvalidInput("NF number is required".into()));
        }
        if state.rows.is_empty() {
            return Err(MarOpsError::InvalidInput("add at least one insumo".into()));
        }

        let mut insumos = Vec::with_capacity(state.rows.len());
        for (index, row) in state.rows.iter().enumerate() {
            let Some(id) = row.insumo.clone() else {
                return Err(MarOpsError::InvalidInput(format!("row {}: select an insumo", index + 1)));
            };
            let quantidade = parse_decimal(&row.quantidade)
                .filter(|q| *q > 0.0)
                .ok_or_else(|| {
                    MarOpsError::InvalidInput(format!(
                        "row {}: invalid quantity {:?}",
                        index + 1,
                        row.quantidade
                    ))
                })?;
            insumos.push(IntakeLine { id, quantidade });
        }
        Ok(StockIntake { nf_numero: nf_numero.to_string(), insumos })
    }

    /// Validate and post the intake; the form is cleared on success.
    ///
    /// # Errors
    /// Validation errors, or the backend failure (the form is kept then).
    #[instrument(skip(self))]
    pub async fn submit(&self) -> Result<()> {
        let intake = self.validate()?;
        self.stock.register_intake(&intake).await?;
        info!(nf = %intake.nf_numero, rows = intake.insumos.len(), "Stock intake registered");

        let mut state = self.state.write();
        state.nf_numero.clear();
        state.rows.clear();
        Ok(())
    }

    fn with_row(&self, index: usize, edit: impl FnOnce(&mut IntakeRow)) -> Result<()> {
        let mut state = self.state.write();
        let row = state
            .rows
            .get_mut(index)
            .ok_or_else(|| MarOpsError::NotFound(format!("intake row {index}")))?;
        edit(row);
        Ok(())
    }
}
