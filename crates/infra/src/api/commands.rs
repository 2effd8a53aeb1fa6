//! Production and stock endpoints
//!
//! Implements [`ProductionPort`] and [`StockPort`] over the gateway. Response
//! shapes vary between backend versions, so list payloads are accepted both
//! wrapped and bare.

use std::sync::Arc;

use async_trait::async_trait;
use marops_core::production::ports::ProductionPort;
use marops_core::stock::ports::StockPort;
use marops_domain::utils::lenient::parse_decimal;
use marops_domain::{
    ItemCountField, LineStatus, MaterialLine, MaterialRequest, NewProductionItem,
    NewProductionLot, ProductionLot, RecordId, Result, StockIntake, StockRecord,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, instrument};
use urlencoding::encode;

use super::client::ApiClient;
use super::errors::ApiError;

#[derive(Debug, Deserialize)]
struct CreatedResponse {
    id: RecordId,
}

#[derive(Serialize)]
struct MaterialListRequest<'a> {
    insumos: &'a [MaterialRequest],
}

#[derive(Serialize)]
struct SupplyRequest {
    quantidade: f64,
}

/// `{"insumos": [...]}` or the bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum MaterialListBody {
    Wrapped { insumos: Vec<MaterialLine> },
    Bare(Vec<MaterialLine>),
}

fn decode_material_list(value: Value) -> std::result::Result<Vec<MaterialLine>, ApiError> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    match serde_json::from_value(value) {
        Ok(MaterialListBody::Wrapped { insumos } | MaterialListBody::Bare(insumos)) => Ok(insumos),
        Err(e) => Err(ApiError::Decode(format!("material list: {e}"))),
    }
}

fn lenient_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_decimal(s),
        _ => None,
    }
}

fn lot_path(lot: &RecordId) -> String {
    format!("/api/producao/{}/", encode(lot.as_str()))
}

fn item_path(item: &RecordId) -> String {
    format!("/api/producao-itens/{}/", encode(item.as_str()))
}

/// Port implementations over `/api/producao*` and `/api/estoque/*`
pub struct ApiCommands {
    client: Arc<ApiClient>,
}

impl ApiCommands {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProductionPort for ApiCommands {
    #[instrument(skip(self))]
    async fn list_lots(&self) -> Result<Vec<ProductionLot>> {
        let lots: Vec<ProductionLot> = self.client.get("/api/producao/").await?;
        debug!(count = lots.len(), "Production lots fetched");
        Ok(lots)
    }

    #[instrument(skip(self))]
    async fn get_lot(&self, id: &RecordId) -> Result<ProductionLot> {
        Ok(self.client.get(&lot_path(id)).await?)
    }

    #[instrument(skip(self))]
    async fn create_lot(&self, lot: &NewProductionLot) -> Result<()> {
        self.client.post::<_, Value>("/api/producao/", lot).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn finalize_lot(&self, id: &RecordId) -> Result<()> {
        self.client.post_empty::<Value>(&format!("{}finalizar/", lot_path(id))).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn add_item(&self, item: &NewProductionItem) -> Result<RecordId> {
        let created: CreatedResponse = self.client.post("/api/producao-itens/", item).await?;
        Ok(created.id)
    }

    #[instrument(skip(self))]
    async fn update_item_count(
        &self,
        item: &RecordId,
        field: ItemCountField,
        value: f64,
    ) -> Result<Option<LineStatus>> {
        let mut body = Map::new();
        body.insert(field.wire_name().to_string(), Value::from(value));
        let updated: Value = self.client.patch(&item_path(item), &body).await?;
        Ok(updated.get("status").and_then(Value::as_str).and_then(LineStatus::from_wire))
    }

    #[instrument(skip(self))]
    async fn delete_item(&self, item: &RecordId) -> Result<()> {
        self.client.delete(&item_path(item)).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn material_list(&self, lot: &RecordId) -> Result<Vec<MaterialLine>> {
        match self.client.get::<Value>(&format!("{}lista-insumos/", lot_path(lot))).await {
            Ok(value) => Ok(decode_material_list(value)?),
            Err(err) if err.is_not_found() => {
                debug!("No material list generated yet");
                Ok(Vec::new())
            }
            Err(err) => Err(err.into()),
        }
    }

    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    async fn save_material_list(
        &self,
        lot: &RecordId,
        lines: &[MaterialRequest],
    ) -> Result<Vec<MaterialLine>> {
        let saved: Value = self
            .client
            .post(
                &format!("{}gerar-lista-insumos/", lot_path(lot)),
                &MaterialListRequest { insumos: lines },
            )
            .await?;
        Ok(decode_material_list(saved)?)
    }

    #[instrument(skip(self))]
    async fn supply_material(
        &self,
        lot: &RecordId,
        insumo: &RecordId,
        quantidade: f64,
    ) -> Result<Option<f64>> {
        let path = format!("{}insumo/{}/fornecer/", lot_path(lot), encode(insumo.as_str()));
        let confirmed: Value = self.client.post(&path, &SupplyRequest { quantidade }).await?;
        Ok(confirmed.get("quantidade_recebida").and_then(lenient_number))
    }
}

#[async_trait]
impl StockPort for ApiCommands {
    #[instrument(skip(self))]
    async fn list_insumos(&self) -> Result<Vec<StockRecord>> {
        Ok(self.client.get("/api/estoque/insumos/").await?)
    }

    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<StockRecord>> {
        Ok(self.client.get("/api/estoque/produtos/").await?)
    }

    #[instrument(skip(self, intake), fields(nf = %intake.nf_numero, rows = intake.insumos.len()))]
    async fn register_intake(&self, intake: &StockIntake) -> Result<()> {
        self.client.post::<_, Value>("/api/estoque/entrada/entrada-multipla/", intake).await?;
        Ok(())
    }
}
