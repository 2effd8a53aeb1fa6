//! Health snapshot of the running client
//!
//! The session gates everything else: without a user no screen can load, so
//! a client is healthy only when the session is up and no more than one
//! background component is down.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// State of one component at check time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// `session`, `chart_scheduler` or `chart`.
    pub name: String,
    pub is_healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ComponentHealth {
    pub fn healthy(name: impl Into<String>) -> Self {
        Self { name: name.into(), is_healthy: true, message: None }
    }

    pub fn unhealthy(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self { name: name.into(), is_healthy: false, message: Some(message.into()) }
    }
}

/// Snapshot returned by [`crate::AppContext::health_check`].
///
/// ```
/// use marops_app::utils::health::{ComponentHealth, HealthStatus};
///
/// let status = HealthStatus::from_components(vec![
///     ComponentHealth::healthy("session"),
///     ComponentHealth::unhealthy("chart", "no data loaded"),
/// ]);
/// assert!(status.is_healthy);
/// assert_eq!(status.score, 0.5);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub is_healthy: bool,
    /// Share of healthy components, 1.0 when there are none.
    pub score: f64,
    pub components: Vec<ComponentHealth>,
    pub checked_at: DateTime<Utc>,
}

impl HealthStatus {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_components(components: Vec<ComponentHealth>) -> Self {
        let down = components.iter().filter(|c| !c.is_healthy).count();
        let score = if components.is_empty() {
            1.0
        } else {
            (components.len() - down) as f64 / components.len() as f64
        };
        let session_up = !components.iter().any(|c| c.name == "session" && !c.is_healthy);

        Self { is_healthy: session_up && down <= 1, score, components, checked_at: Utc::now() }
    }

    #[must_use]
    pub fn component(&self, name: &str) -> Option<&ComponentHealth> {
        self.components.iter().find(|c| c.name == name)
    }
}
