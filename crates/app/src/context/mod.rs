//! Application context - dependency injection container

use std::sync::Arc;
use std::time::Duration;

use marops_core::navigation::ports::LoginRedirect;
use marops_core::production::ports::ProductionPort;
use marops_core::session::ports::AuthPort;
use marops_core::stock::ports::{ChartCachePort, StockPort};
use marops_core::{
    ColdStorageEditor, ColdStorageQueue, Navigator, ProductionBoard, ProductionEditor,
    RouteTable, SessionState, SessionStore, StockChart, StockIntakeForm, StockOverview,
};
use marops_domain::{AppConfig, MarOpsError, RecordId, Result};
use marops_infra::api::SchedulerConfig;
use marops_infra::{
    config, observability, ApiAuthService, ApiClient, ApiClientConfig, ApiCommands,
    ChartScheduler, FileChartCache,
};
use tracing::{debug, error, info, warn};

use crate::utils::health::{ComponentHealth, HealthStatus};

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: AppConfig,
    pub gateway: Arc<ApiClient>,
    pub session: Arc<SessionStore>,
    pub navigator: Arc<Navigator>,
    pub production: Arc<dyn ProductionPort>,
    pub stock: Arc<dyn StockPort>,
    pub chart: Arc<StockChart>,
    pub chart_scheduler: Arc<ChartScheduler>,
}

impl AppContext {
    /// Create a context from `.env`, the environment and config files, and
    /// install the tracing subscriber.
    ///
    /// # Errors
    /// `Config` when a configuration source is malformed.
    pub fn new() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "Loaded .env file"),
            Err(err) => debug!(error = %err, "No .env file loaded"),
        }
        let config = config::load_or_default()?;
        if !observability::init_tracing(&config.logging)? {
            debug!("Tracing subscriber already installed");
        }
        Self::new_with_config(config)
    }

    /// Create a context with an explicit configuration
    ///
    /// This method is primarily for testing, allowing tests to point the
    /// gateway at a mock backend and the cache at a temporary directory.
    ///
    /// # Errors
    /// `Config` when the gateway cannot be built from `config.api`.
    pub fn new_with_config(config: AppConfig) -> Result<Self> {
        let gateway = Arc::new(ApiClient::new(ApiClientConfig::from(&config.api))?);

        let auth: Arc<dyn AuthPort> = Arc::new(ApiAuthService::new(gateway.clone()));
        let session = Arc::new(SessionStore::new(auth));
        let navigator = Arc::new(Navigator::new(RouteTable::standard(), session.clone()));

        // The gateway only keeps a weak handle; `navigator` keeps it alive.
        let redirect: Arc<dyn LoginRedirect> = navigator.clone();
        gateway.set_login_redirect(&redirect);

        let commands = Arc::new(ApiCommands::new(gateway.clone()));
        let production: Arc<dyn ProductionPort> = commands.clone();
        let stock: Arc<dyn StockPort> = commands;

        let cache: Arc<dyn ChartCachePort> = Arc::new(FileChartCache::new(config.cache.dir.clone()));
        let chart = Arc::new(StockChart::new(stock.clone(), cache, config.cache.chart_ttl()));
        let chart_scheduler =
            Arc::new(ChartScheduler::new(chart.clone(), SchedulerConfig::from(&config.cache)));

        info!(base_url = %config.api.base_url, "Application context created");

        Ok(Self { config, gateway, session, navigator, production, stock, chart, chart_scheduler })
    }

    /// Resolve the session and start background refreshes.
    ///
    /// # Errors
    /// `Internal` when the chart scheduler fails to start in time.
    pub async fn start(&self) -> Result<SessionState> {
        let state = self.session.init().await;

        let start_timeout = Duration::from_secs(10);
        tokio::time::timeout(start_timeout, self.chart_scheduler.start())
            .await
            .map_err(|_| {
                error!(timeout_secs = 10, "ChartScheduler start timed out");
                MarOpsError::Internal("ChartScheduler start timed out after 10s".into())
            })?
            .map_err(|err| {
                error!(error = %err, "failed to start ChartScheduler");
                MarOpsError::Internal(format!("failed to start ChartScheduler: {err}"))
            })?;

        Ok(state)
    }

    #[must_use]
    pub fn production_board(&self) -> ProductionBoard {
        ProductionBoard::new(self.production.clone())
    }

    #[must_use]
    pub fn production_editor(&self, lot: RecordId) -> ProductionEditor {
        ProductionEditor::new(self.production.clone(), self.stock.clone(), lot, &self.config.editing)
    }

    #[must_use]
    pub fn cold_storage_queue(&self) -> ColdStorageQueue {
        ColdStorageQueue::new(self.production.clone())
    }

    #[must_use]
    pub fn cold_storage_editor(&self, lot: RecordId) -> ColdStorageEditor {
        ColdStorageEditor::new(self.production.clone(), lot, &self.config.editing)
    }

    #[must_use]
    pub fn stock_overview(&self) -> StockOverview {
        StockOverview::new(self.stock.clone(), self.production.clone())
    }

    #[must_use]
    pub fn stock_intake(&self) -> StockIntakeForm {
        StockIntakeForm::new(self.stock.clone())
    }

    pub async fn health_check(&self) -> HealthStatus {
        let session = match self.session.state() {
            SessionState::Authenticated(_) => ComponentHealth::healthy("session"),
            SessionState::Loading => ComponentHealth::unhealthy("session", "still resolving"),
            SessionState::Unauthenticated => {
                ComponentHealth::unhealthy("session", "not authenticated")
            }
        };
        let scheduler = if self.chart_scheduler.is_running().await {
            ComponentHealth::healthy("chart_scheduler")
        } else {
            ComponentHealth::unhealthy("chart_scheduler", "not running")
        };
        let chart = if self.chart.points().is_empty() {
            ComponentHealth::unhealthy("chart", "no data loaded")
        } else {
            ComponentHealth::healthy("chart")
        };

        HealthStatus::from_components(vec![session, scheduler, chart])
    }

    /// Stop background work. Open editors cancel their own timers when
    /// closed or dropped.
    ///
    /// # Errors
    /// `Internal` when the scheduler task does not stop cleanly.
    pub async fn shutdown(&self) -> Result<()> {
        info!("shutdown called on AppContext");

        if self.chart_scheduler.is_running().await {
            self.chart_scheduler.stop().await.map_err(|err| {
                warn!(error = %err, "failed to stop ChartScheduler");
                MarOpsError::Internal(format!("failed to stop ChartScheduler: {err}"))
            })?;
        }
        Ok(())
    }
}
