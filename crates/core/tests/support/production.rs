//! In-memory `ProductionPort`

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use marops_core::production::ports::ProductionPort;
use marops_domain::{
    derive_line_status, ItemCountField, LineStatus, LotStatus, MarOpsError, MaterialLine,
    MaterialRequest, NewProductionItem, NewProductionLot, ProductionItem, ProductionLot, RecordId,
    Result as DomainResult,
};

/// Calls observed by the mock, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateLot(NewProductionLot),
    Finalize(RecordId),
    AddItem(NewProductionItem),
    UpdateCount(RecordId, ItemCountField, f64),
    DeleteItem(RecordId),
    SaveMaterials(RecordId, Vec<MaterialRequest>),
    Supply(RecordId, RecordId, f64),
}

/// Mock backend for lots, items and material lists.
///
/// Supplies update the stored material line and echo the new received
/// quantity, like the real endpoint.
#[derive(Default)]
pub struct MockProductionPort {
    lots: Mutex<Vec<ProductionLot>>,
    materials: Mutex<HashMap<RecordId, Vec<MaterialLine>>>,
    calls: Mutex<Vec<Call>>,
    next_id: AtomicI64,
    failing: AtomicBool,
    failing_supply: AtomicBool,
    supply_latency_ms: AtomicU64,
    supplies_in_flight: AtomicUsize,
    max_supplies_in_flight: AtomicUsize,
}

impl MockProductionPort {
    pub fn new(lots: Vec<ProductionLot>) -> Self {
        Self { lots: Mutex::new(lots), next_id: AtomicI64::new(1000), ..Self::default() }
    }

    pub fn with_materials(self, lot: i64, lines: Vec<MaterialLine>) -> Self {
        self.materials.lock().unwrap().insert(RecordId::from(lot), lines);
        self
    }

    /// Make every call fail with a network error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_failing_supply(&self, failing: bool) {
        self.failing_supply.store(failing, Ordering::SeqCst);
    }

    /// Delay every supply answer; the stored quantity changes on answer.
    pub fn set_supply_latency(&self, latency: Duration) {
        let millis = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self.supply_latency_ms.store(millis, Ordering::SeqCst);
    }

    /// Most supplies ever waiting for an answer at the same time.
    pub fn max_supplies_in_flight(&self) -> usize {
        self.max_supplies_in_flight.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn supplies(&self) -> Vec<(RecordId, f64)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Supply(_, insumo, qty) => Some((insumo, qty)),
                _ => None,
            })
            .collect()
    }

    pub fn lot(&self, id: i64) -> Option<ProductionLot> {
        self.lots.lock().unwrap().iter().find(|l| l.id == RecordId::from(id)).cloned()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self) -> DomainResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MarOpsError::Network("backend unreachable".into()));
        }
        Ok(())
    }
}

pub fn material(insumo: i64, nome: &str, required: f64, received: f64) -> MaterialLine {
    MaterialLine {
        id: Some(RecordId::from(insumo + 500)),
        insumo_id: RecordId::from(insumo),
        nome: nome.to_string(),
        quantidade_necessaria: required,
        quantidade_recebida: received,
        unidade_medida: Some("kg".to_string()),
        status: None,
    }
}

#[async_trait]
impl ProductionPort for MockProductionPort {
    async fn list_lots(&self) -> DomainResult<Vec<ProductionLot>> {
        self.check()?;
        Ok(self.lots.lock().unwrap().clone())
    }

    async fn get_lot(&self, id: &RecordId) -> DomainResult<ProductionLot> {
        self.check()?;
        self.lots
            .lock()
            .unwrap()
            .iter()
            .find(|l| &l.id == id)
            .cloned()
            .ok_or_else(|| MarOpsError::NotFound(format!("lot {id}")))
    }

    async fn create_lot(&self, lot: &NewProductionLot) -> DomainResult<()> {
        self.check()?;
        self.record(Call::CreateLot(lot.clone()));
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.lots.lock().unwrap().push(ProductionLot {
            id: RecordId::from(id),
            data: lot.data,
            status: LotStatus::Draft,
            itens: Vec::new(),
            observacao: Some(lot.observacao.clone()),
        });
        Ok(())
    }

    async fn finalize_lot(&self, id: &RecordId) -> DomainResult<()> {
        self.check()?;
        self.record(Call::Finalize(id.clone()));
        if let Some(lot) = self.lots.lock().unwrap().iter_mut().find(|l| &l.id == id) {
            lot.status = LotStatus::Finalized;
        }
        Ok(())
    }

    async fn add_item(&self, item: &NewProductionItem) -> DomainResult<RecordId> {
        self.check()?;
        self.record(Call::AddItem(item.clone()));
        let id = RecordId::from(self.next_id.fetch_add(1, Ordering::SeqCst));
        if let Some(lot) = self.lots.lock().unwrap().iter_mut().find(|l| l.id == item.producao) {
            lot.itens.push(ProductionItem {
                id: id.clone(),
                produto: item.produto.clone(),
                produto_nome: String::new(),
                quantidade_esperada: item.quantidade_esperada,
                quantidade_conferida_producao: 0.0,
                quantidade_conferida_camara: 0.0,
                status: Some(LineStatus::Pending),
            });
        }
        Ok(id)
    }

    async fn update_item_count(
        &self,
        item: &RecordId,
        field: ItemCountField,
        value: f64,
    ) -> DomainResult<Option<LineStatus>> {
        self.check()?;
        self.record(Call::UpdateCount(item.clone(), field, value));
        let mut lots = self.lots.lock().unwrap();
        let stored = lots.iter_mut().flat_map(|l| l.itens.iter_mut()).find(|i| &i.id == item);
        Ok(stored.map(|stored| {
            stored.set_count(field, value);
            derive_line_status(value, stored.quantidade_esperada)
        }))
    }

    async fn delete_item(&self, item: &RecordId) -> DomainResult<()> {
        self.check()?;
        self.record(Call::DeleteItem(item.clone()));
        for lot in self.lots.lock().unwrap().iter_mut() {
            lot.itens.retain(|i| &i.id != item);
        }
        Ok(())
    }

    async fn material_list(&self, lot: &RecordId) -> DomainResult<Vec<MaterialLine>> {
        self.check()?;
        Ok(self.materials.lock().unwrap().get(lot).cloned().unwrap_or_default())
    }

    async fn save_material_list(
        &self,
        lot: &RecordId,
        lines: &[MaterialRequest],
    ) -> DomainResult<Vec<MaterialLine>> {
        self.check()?;
        self.record(Call::SaveMaterials(lot.clone(), lines.to_vec()));
        let mut materials = self.materials.lock().unwrap();
        let previous = materials.remove(lot).unwrap_or_default();
        let saved: Vec<MaterialLine> = lines
            .iter()
            .map(|req| {
                let old = previous.iter().find(|m| m.insumo_id == req.insumo_id);
                MaterialLine {
                    id: old.and_then(|m| m.id.clone()),
                    insumo_id: req.insumo_id.clone(),
                    nome: old.map(|m| m.nome.clone()).unwrap_or_default(),
                    quantidade_necessaria: req.quantidade_necessaria,
                    quantidade_recebida: req
                        .quantidade_recebida
                        .or_else(|| old.map(|m| m.quantidade_recebida))
                        .unwrap_or_default(),
                    unidade_medida: old.and_then(|m| m.unidade_medida.clone()),
                    status: None,
                }
            })
            .collect();
        materials.insert(lot.clone(), saved.clone());
        Ok(saved)
    }

    async fn supply_material(
        &self,
        lot: &RecordId,
        insumo: &RecordId,
        quantidade: f64,
    ) -> DomainResult<Option<f64>> {
        self.check()?;
        self.record(Call::Supply(lot.clone(), insumo.clone(), quantidade));
        let running = self.supplies_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_supplies_in_flight.fetch_max(running, Ordering::SeqCst);
        let latency = self.supply_latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        self.supplies_in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.failing_supply.load(Ordering::SeqCst) {
            return Err(MarOpsError::Network("supply rejected".into()));
        }
        let mut materials = self.materials.lock().unwrap();
        let line = materials
            .get_mut(lot)
            .and_then(|lines| lines.iter_mut().find(|m| &m.insumo_id == insumo));
        Ok(line.map(|line| {
            line.quantidade_recebida += quantidade;
            line.quantidade_recebida
        }))
    }
}
