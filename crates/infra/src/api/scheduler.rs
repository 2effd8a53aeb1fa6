//! Stock chart refresh scheduler
//!
//! Refreshes the stock chart periodically with lifecycle management. Each
//! tick goes through the chart's cache, so a fresh entry costs no request.

use std::sync::Arc;
use std::time::Duration;

use marops_core::stock::StockChart;
use marops_domain::CacheConfig;
use parking_lot::Mutex as SyncMutex;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Type alias for task handle to avoid complexity warnings
type TaskHandle = Arc<Mutex<Option<JoinHandle<()>>>>;

/// Configuration for the chart scheduler
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Refresh interval
    pub interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::from(&CacheConfig::default())
    }
}

impl From<&CacheConfig> for SchedulerConfig {
    fn from(config: &CacheConfig) -> Self {
        Self { interval: config.chart_refresh() }
    }
}

/// Periodic stock chart refresher
pub struct ChartScheduler {
    chart: Arc<StockChart>,
    config: SchedulerConfig,
    cancellation_token: SyncMutex<CancellationToken>,
    task_handle: TaskHandle,
}

impl ChartScheduler {
    pub fn new(chart: Arc<StockChart>, config: SchedulerConfig) -> Self {
        Self {
            chart,
            config,
            cancellation_token: SyncMutex::new(CancellationToken::new()),
            task_handle: Arc::new(Mutex::new(None)),
        }
    }

    /// Start the scheduler
    ///
    /// Spawns a background task that refreshes the chart every interval.
    ///
    /// # Errors
    ///
    /// Returns error if scheduler is already running
    #[instrument(skip(self))]
    pub async fn start(&self) -> Result<(), String> {
        let mut handle_slot = self.task_handle.lock().await;
        if handle_slot.is_some() {
            return Err("Scheduler already running".to_string());
        }

        // Fresh token so the scheduler can restart after stop
        let cancel = CancellationToken::new();
        *self.cancellation_token.lock() = cancel.clone();

        let chart = Arc::clone(&self.chart);
        let interval = self.config.interval;
        *handle_slot = Some(tokio::spawn(async move {
            Self::refresh_loop(chart, interval, cancel).await;
        }));

        info!(interval_secs = interval.as_secs(), "Chart scheduler started");
        Ok(())
    }

    /// Stop the scheduler gracefully
    ///
    /// Cancels the background task and awaits completion.
    ///
    /// # Errors
    ///
    /// Returns error if scheduler is not running
    #[instrument(skip(self))]
    pub async fn stop(&self) -> Result<(), String> {
        let Some(handle) = self.task_handle.lock().await.take() else {
            return Err("Scheduler not running".to_string());
        };

        self.cancellation_token.lock().cancel();

        match tokio::time::timeout(Duration::from_secs(5), handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!("Scheduler task panicked: {}", e);
                return Err("Scheduler task panicked".to_string());
            }
            Err(_) => {
                warn!("Scheduler task did not complete within timeout");
                return Err("Scheduler task timeout".to_string());
            }
        }

        info!("Chart scheduler stopped");
        Ok(())
    }

    /// Check if scheduler is running
    pub async fn is_running(&self) -> bool {
        self.task_handle.lock().await.is_some()
    }

    async fn refresh_loop(chart: Arc<StockChart>, interval: Duration, cancel: CancellationToken) {
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!("Chart refresh loop cancelled");
                    break;
                }
                () = tokio::time::sleep(interval) => {
                    let points = chart.refresh(false).await;
                    debug!(points, "Periodic chart refresh");
                }
            }
        }
    }
}

/// Ensure scheduler is stopped when dropped
impl Drop for ChartScheduler {
    fn drop(&mut self) {
        let token = self.cancellation_token.get_mut();
        if !token.is_cancelled() {
            token.cancel();
        }
    }
}
