//! Backend gateway
//!
//! Every call goes to `base_url + path` with cookie credentials. A `401` on a
//! request that is not itself a replay triggers a session refresh:
//!
//! - if a refresh is already running, the caller queues behind it;
//! - otherwise exactly one `POST /auth/refresh/` is issued;
//! - on success every queued caller replays its request once;
//! - on failure every queued caller is rejected and the login redirect fires.
//!
//! The refresh call itself is never intercepted.

use std::sync::{Arc, Weak};
use std::time::Duration;

use marops_core::navigation::ports::LoginRedirect;
use marops_domain::ApiConfig;
use parking_lot::{Mutex, RwLock};
use reqwest::header::ACCEPT;
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{debug, info, instrument, warn};

use super::errors::ApiError;
use crate::http::HttpClient;

pub const REFRESH_PATH: &str = "/auth/refresh/";

/// Configuration for the gateway
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Backend origin, e.g. `http://localhost:8000`
    pub base_url: String,
    /// Timeout of a single attempt
    pub timeout: Duration,
    /// Attempts for idempotent requests
    pub max_attempts: usize,
    /// Delay before the first transport retry
    pub base_backoff: Duration,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self::from(&ApiConfig::default())
    }
}

impl From<&ApiConfig> for ApiClientConfig {
    fn from(config: &ApiConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout: config.timeout(),
            max_attempts: usize::try_from(config.max_attempts).unwrap_or(1).max(1),
            base_backoff: Duration::from_millis(200),
        }
    }
}

#[derive(Default)]
struct RefreshState {
    in_flight: bool,
    waiters: Vec<oneshot::Sender<bool>>,
}

/// Releases the refresh slot and answers the queue, also when the refreshing
/// caller is dropped mid-flight.
struct RefreshSlot<'a> {
    state: &'a Mutex<RefreshState>,
    refreshed: bool,
}

impl Drop for RefreshSlot<'_> {
    fn drop(&mut self) {
        let waiters = {
            let mut state = self.state.lock();
            state.in_flight = false;
            std::mem::take(&mut state.waiters)
        };
        for waiter in waiters {
            // A dropped waiter no longer cares about the outcome.
            let _ = waiter.send(self.refreshed);
        }
    }
}

/// HTTP gateway to the MarOps backend
pub struct ApiClient {
    http: HttpClient,
    config: ApiClientConfig,
    refresh: Mutex<RefreshState>,
    login_redirect: RwLock<Option<Weak<dyn LoginRedirect>>>,
}

impl ApiClient {
    /// Create a new gateway
    ///
    /// # Errors
    ///
    /// Returns `Config` if the base URL is not an absolute http(s) URL or
    /// the HTTP client cannot be created
    pub fn new(config: ApiClientConfig) -> Result<Self, ApiError> {
        let parsed = url::Url::parse(&config.base_url)
            .map_err(|e| ApiError::Config(format!("invalid base URL {:?}: {e}", config.base_url)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::Config(format!("unsupported scheme in {}", config.base_url)));
        }

        let http = HttpClient::builder()
            .timeout(config.timeout)
            .max_attempts(config.max_attempts)
            .base_backoff(config.base_backoff)
            .user_agent(concat!("marops/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to build HttpClient: {e}")))?;

        Ok(Self {
            http,
            config,
            refresh: Mutex::new(RefreshState::default()),
            login_redirect: RwLock::new(None),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Register where to send the user when the session cannot be restored.
    ///
    /// Only a weak reference is kept; the navigator owns the gateway
    /// indirectly through the session store.
    pub fn set_login_redirect(&self, redirect: &Arc<dyn LoginRedirect>) {
        *self.login_redirect.write() = Some(Arc::downgrade(redirect));
    }

    /// # Errors
    /// See [`ApiError`]
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.call(Method::GET, path, None).await
    }

    /// # Errors
    /// See [`ApiError`]
    pub async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = Self::encode(body)?;
        self.call(Method::POST, path, Some(&body)).await
    }

    /// `POST` without a request body.
    ///
    /// # Errors
    /// See [`ApiError`]
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.call(Method::POST, path, None).await
    }

    /// # Errors
    /// See [`ApiError`]
    pub async fn patch<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = Self::encode(body)?;
        self.call(Method::PATCH, path, Some(&body)).await
    }

    /// # Errors
    /// See [`ApiError`]
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.call::<Value>(Method::DELETE, path, None).await.map(|_| ())
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T, ApiError> {
        let value = self.request_value(method, path, body).await?;
        serde_json::from_value(value).map_err(|e| ApiError::Decode(format!("{path}: {e}")))
    }

    #[instrument(skip(self, body), fields(method = %method, path = %path))]
    async fn request_value(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let url = self.url(path);
        let response = self.send(&method, &url, body).await?;

        if response.status() == StatusCode::UNAUTHORIZED && !is_refresh_path(path) {
            debug!("Unauthorized; restoring session before replay");
            self.restore_session().await?;
            let replay = self.send(&method, &url, body).await?;
            return Self::read_body(replay, &url).await;
        }

        Self::read_body(response, &url).await
    }

    async fn restore_session(&self) -> Result<(), ApiError> {
        let waiter = {
            let mut state = self.refresh.lock();
            if state.in_flight {
                let (tx, rx) = oneshot::channel();
                state.waiters.push(tx);
                Some(rx)
            } else {
                state.in_flight = true;
                None
            }
        };

        if let Some(rx) = waiter {
            debug!("Queued behind session refresh in flight");
            return match rx.await {
                Ok(true) => Ok(()),
                _ => Err(ApiError::SessionExpired("session refresh failed".into())),
            };
        }

        let mut slot = RefreshSlot { state: &self.refresh, refreshed: false };
        let outcome = self.refresh_credentials().await;
        slot.refreshed = outcome.is_ok();
        drop(slot);

        match outcome {
            Ok(()) => {
                info!("Session refreshed");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Session refresh failed; redirecting to login");
                self.redirect_to_login();
                Err(ApiError::SessionExpired(err.to_string()))
            }
        }
    }

    async fn refresh_credentials(&self) -> Result<(), ApiError> {
        let url = self.url(REFRESH_PATH);
        let response = self.send(&Method::POST, &url, None).await?;
        Self::read_body(response, &url).await.map(|_| ())
    }

    fn redirect_to_login(&self) {
        let redirect = self.login_redirect.read().as_ref().and_then(Weak::upgrade);
        match redirect {
            Some(redirect) => redirect.redirect_to_login(),
            None => warn!("No login redirect registered"),
        }
    }

    async fn send(
        &self,
        method: &Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Response, ApiError> {
        let mut request = self.http.request(method.clone(), url).header(ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let attempts = u32::try_from(self.config.max_attempts).unwrap_or(1).max(1);
        let budget = self.config.timeout.saturating_mul(attempts);
        match tokio::time::timeout(budget, self.http.send(request)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(err)) => Err(ApiError::from(err)),
            Err(_) => Err(ApiError::Timeout(budget)),
        }
    }

    async fn read_body(response: Response, url: &str) -> Result<Value, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, url, &body));
        }

        // No body by definition
        if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT {
            return Ok(Value::Null);
        }

        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(format!("failed to read body from {url}: {e}")))?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(format!("{url}: {e}")))
    }

    fn encode<B: Serialize>(body: &B) -> Result<Value, ApiError> {
        serde_json::to_value(body)
            .map_err(|e| ApiError::Client(format!("Failed to serialize body: {e}")))
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn is_refresh_path(path: &str) -> bool {
    path.trim_matches('/') == REFRESH_PATH.trim_matches('/')
}
