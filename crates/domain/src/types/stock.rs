//! Stock records and intake payloads

use serde::{Deserialize, Serialize};

use super::RecordId;
use crate::utils::lenient::{de_lenient_f64, de_opt_lenient_string};

/// An insumo or a product as listed by the stock endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    pub id: RecordId,
    #[serde(default)]
    pub nome: String,
    #[serde(default, deserialize_with = "de_opt_lenient_string")]
    pub codigo: Option<String>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub estoque_atual: f64,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub estoque_ideal: f64,
    #[serde(default)]
    pub unidade_medida: Option<String>,
}

impl StockRecord {
    /// Current over ideal stock; lower is more critical.
    ///
    /// Without an ideal level, any stock counts as fully stocked and none as
    /// fully depleted.
    #[must_use]
    pub fn criticality(&self) -> f64 {
        if self.estoque_ideal == 0.0 {
            if self.estoque_atual > 0.0 {
                1.0
            } else {
                0.0
            }
        } else {
            self.estoque_atual / self.estoque_ideal
        }
    }

    /// `"{codigo} - {nome}"`, as shown in pickers and the chart.
    #[must_use]
    pub fn display_label(&self) -> String {
        format!("{} - {}", self.codigo.as_deref().unwrap_or_default(), self.nome)
    }
}

/// Row of a stock intake.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntakeLine {
    pub id: RecordId,
    pub quantidade: f64,
}

/// Body of `POST /api/estoque/entrada/entrada-multipla/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockIntake {
    pub nf_numero: String,
    pub insumos: Vec<IntakeLine>,
}
