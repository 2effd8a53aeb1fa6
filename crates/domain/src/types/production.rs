//! Production lots, their items and their material lists

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::line::{de_opt_line_status, derive_line_status, LineStatus};
use super::RecordId;
use crate::impl_wire_enum_conversions;
use crate::utils::lenient::de_lenient_f64;

/// Lifecycle of a production lot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LotStatus {
    Draft,
    AwaitingCheck,
    /// Terminal; the lot no longer accepts edits.
    Finalized,
    Other(String),
}

impl_wire_enum_conversions!(LotStatus {
    Draft => "RASCUNHO",
    AwaitingCheck => "AGUARDANDO_CONF",
    Finalized => "FINALIZADO",
} else Other);

impl LotStatus {
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        matches!(self, Self::Finalized)
    }

    /// Lots still waiting for the cold-storage check.
    #[must_use]
    pub const fn awaits_cold_storage(&self) -> bool {
        matches!(self, Self::Draft | Self::AwaitingCheck)
    }
}

/// Accepts `YYYY-MM-DD` as well as full timestamps; only the date is kept.
fn de_lot_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let date_part = raw.get(..10).unwrap_or(&raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionLot {
    pub id: RecordId,
    #[serde(deserialize_with = "de_lot_date")]
    pub data: NaiveDate,
    pub status: LotStatus,
    #[serde(default)]
    pub itens: Vec<ProductionItem>,
    #[serde(default)]
    pub observacao: Option<String>,
}

impl ProductionLot {
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.status.is_locked()
    }

    #[must_use]
    pub fn is_on(&self, day: NaiveDate) -> bool {
        self.data == day
    }

    /// Sum of planned quantities over all items.
    #[must_use]
    pub fn planned_total(&self) -> f64 {
        self.itens.iter().map(|i| i.quantidade_esperada).sum()
    }
}

/// One product line of a lot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionItem {
    pub id: RecordId,
    pub produto: RecordId,
    #[serde(default)]
    pub produto_nome: String,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub quantidade_esperada: f64,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub quantidade_conferida_producao: f64,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub quantidade_conferida_camara: f64,
    #[serde(default, deserialize_with = "de_opt_line_status")]
    pub status: Option<LineStatus>,
}

/// Per-item counts that are edited by typing and saved with `PATCH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemCountField {
    /// Counted on the production floor.
    Produced,
    /// Counted at cold-storage check-in.
    ChamberCount,
}

impl ItemCountField {
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Produced => "quantidade_conferida_producao",
            Self::ChamberCount => "quantidade_conferida_camara",
        }
    }
}

impl ProductionItem {
    #[must_use]
    pub const fn count(&self, field: ItemCountField) -> f64 {
        match field {
            ItemCountField::Produced => self.quantidade_conferida_producao,
            ItemCountField::ChamberCount => self.quantidade_conferida_camara,
        }
    }

    pub fn set_count(&mut self, field: ItemCountField, value: f64) {
        match field {
            ItemCountField::Produced => self.quantidade_conferida_producao = value,
            ItemCountField::ChamberCount => self.quantidade_conferida_camara = value,
        }
    }
}

/// Body of `POST /api/producao/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewProductionLot {
    pub data: NaiveDate,
    pub observacao: String,
}

/// Body of `POST /api/producao-itens/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProductionItem {
    pub producao: RecordId,
    pub produto: RecordId,
    pub quantidade_esperada: f64,
    pub quantidade_conferida_producao: f64,
    pub quantidade_conferida_camara: f64,
}

impl NewProductionItem {
    #[must_use]
    pub fn planned(producao: RecordId, produto: RecordId, quantidade_esperada: f64) -> Self {
        Self {
            producao,
            produto,
            quantidade_esperada,
            quantidade_conferida_producao: 0.0,
            quantidade_conferida_camara: 0.0,
        }
    }
}

/// Raw material (insumo) required by a lot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialLine {
    #[serde(default)]
    pub id: Option<RecordId>,
    pub insumo_id: RecordId,
    #[serde(default)]
    pub nome: String,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub quantidade_necessaria: f64,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub quantidade_recebida: f64,
    #[serde(default, alias = "unidade")]
    pub unidade_medida: Option<String>,
    #[serde(default, deserialize_with = "de_opt_line_status")]
    pub status: Option<LineStatus>,
}

impl MaterialLine {
    /// Server status when present, otherwise derived from the quantities.
    #[must_use]
    pub fn effective_status(&self) -> LineStatus {
        self.status
            .unwrap_or_else(|| derive_line_status(self.quantidade_recebida, self.quantidade_necessaria))
    }

    #[must_use]
    pub fn unit_label(&self) -> &str {
        match self.unidade_medida.as_deref() {
            Some(unit) if !unit.is_empty() => unit,
            _ => "UN",
        }
    }
}

/// Entry of the `gerar-lista-insumos` payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialRequest {
    pub insumo_id: RecordId,
    pub quantidade_necessaria: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantidade_recebida: Option<f64>,
}
