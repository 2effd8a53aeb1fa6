//! Lowest-stock chart
//!
//! Shows the products with the least stock. The computed series is cached
//! under a fixed key and reused while it is younger than the TTL, unless a
//! refresh is forced.

use std::sync::Arc;
use std::time::Duration;

use marops_domain::constants::{CHART_CACHE_KEY, CHART_TOP_N};
use marops_domain::{RecordId, StockRecord};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::ports::{ChartCachePort, StockPort};
use crate::clock::{system_now_millis, NowMillis};

/// One bar of the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub id: RecordId,
    /// `"{codigo} - {nome}"`
    pub name: String,
    pub estoque: f64,
}

/// Cache entry layout: `{ts: epoch_ms, data: [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedChart {
    pub ts: i64,
    pub data: Vec<ChartPoint>,
}

impl CachedChart {
    /// Whether the entry can still be served at `now_ms`.
    #[must_use]
    pub fn is_fresh(&self, now_ms: i64, ttl: Duration) -> bool {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        self.ts > 0 && (0..ttl_ms).contains(&(now_ms - self.ts))
    }
}

/// The `top` products with the lowest stock, ascending.
#[must_use]
pub fn lowest_stock(mut products: Vec<StockRecord>, top: usize) -> Vec<ChartPoint> {
    products.sort_by(|a, b| a.estoque_atual.total_cmp(&b.estoque_atual));
    products
        .into_iter()
        .take(top)
        .map(|p| ChartPoint { name: p.display_label(), id: p.id, estoque: p.estoque_atual })
        .collect()
}

pub struct StockChart {
    stock: Arc<dyn StockPort>,
    cache: Arc<dyn ChartCachePort>,
    ttl: Duration,
    now: NowMillis,
    points: RwLock<Vec<ChartPoint>>,
}

impl StockChart {
    pub fn new(stock: Arc<dyn StockPort>, cache: Arc<dyn ChartCachePort>, ttl: Duration) -> Self {
        Self { stock, cache, ttl, now: system_now_millis(), points: RwLock::new(Vec::new()) }
    }

    #[must_use]
    pub fn with_clock(mut self, now: NowMillis) -> Self {
        self.now = now;
        self
    }

    #[must_use]
    pub fn points(&self) -> Vec<ChartPoint> {
        self.points.read().clone()
    }

    /// Refresh the series, from the cache when fresh and not forced.
    ///
    /// A failed fetch keeps the previous series; cache failures are logged
    /// and otherwise ignored.
    #[instrument(skip(self))]
    pub async fn refresh(&self, force: bool) -> usize {
        let now = (self.now)();

        if !force {
            match self.cache.load(CHART_CACHE_KEY).await {
                Ok(Some(entry)) if entry.is_fresh(now, self.ttl) => {
                    debug!(age_ms = now - entry.ts, "Serving stock chart from cache");
                    let count = entry.data.len();
                    *self.points.write() = entry.data;
                    return count;
                }
                Ok(_) => {}
                Err(err) => warn!(error = %err, "Failed to read stock chart cache"),
            }
        }

        let products = match self.stock.list_products().await {
            Ok(products) => products,
            Err(err) => {
                warn!(error = %err, "Failed to load products for stock chart");
                return self.points.read().len();
            }
        };

        let points = lowest_stock(products, CHART_TOP_N);
        let entry = CachedChart { ts: now, data: points.clone() };
        if let Err(err) = self.cache.store(CHART_CACHE_KEY, &entry).await {
            warn!(error = %err, "Failed to write stock chart cache");
        }
        let count = points.len();
        *self.points.write() = points;
        count
    }
}
