//! Shared test helpers for `marops-core` integration tests.
//!
//! In-memory ports so screen tests can drive controllers without a backend.

#![allow(dead_code)]

pub mod production;
pub mod stock;

use std::time::Duration;

use chrono::NaiveDate;
use marops_domain::{LotStatus, ProductionItem, ProductionLot, RecordId, StockRecord};

/// Let paused time run forward, then give spawned tasks a chance to finish.
pub async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, d).expect("valid test date")
}

pub fn item(id: i64, produto: i64, planned: f64) -> ProductionItem {
    ProductionItem {
        id: RecordId::from(id),
        produto: RecordId::from(produto),
        produto_nome: format!("Produto {produto}"),
        quantidade_esperada: planned,
        quantidade_conferida_producao: 0.0,
        quantidade_conferida_camara: 0.0,
        status: None,
    }
}

pub fn lot(id: i64, d: u32, status: LotStatus, itens: Vec<ProductionItem>) -> ProductionLot {
    ProductionLot { id: RecordId::from(id), data: day(d), status, itens, observacao: None }
}

pub fn record(id: i64, nome: &str, atual: f64, ideal: f64) -> StockRecord {
    StockRecord {
        id: RecordId::from(id),
        nome: nome.to_string(),
        codigo: Some(format!("C{id}")),
        estoque_atual: atual,
        estoque_ideal: ideal,
        unidade_medida: Some("kg".to_string()),
    }
}
