//! File-backed chart cache
//!
//! One JSON document per key inside the cache directory. Writes go to a
//! temporary sibling first and are renamed into place, so a reader never
//! sees a half-written entry.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use marops_core::stock::ports::ChartCachePort;
use marops_core::stock::CachedChart;
use marops_domain::{MarOpsError, Result};
use tracing::{debug, warn};

use crate::errors::InfraError;

/// [`ChartCachePort`] storing entries under a directory
#[derive(Debug, Clone)]
pub struct FileChartCache {
    dir: PathBuf,
}

impl FileChartCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`; characters outside `[A-Za-z0-9._-]` become `_`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

fn io_error(err: std::io::Error) -> MarOpsError {
    InfraError::from(err).into()
}

#[async_trait]
impl ChartCachePort for FileChartCache {
    async fn load(&self, key: &str) -> Result<Option<CachedChart>> {
        let path = self.path_for(key);
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(io_error(err)),
        };

        match serde_json::from_slice::<CachedChart>(&raw) {
            Ok(entry) => Ok(Some(entry)),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Ignoring corrupt chart cache entry");
                Ok(None)
            }
        }
    }

    async fn store(&self, key: &str, entry: &CachedChart) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(io_error)?;

        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_vec(entry).map_err(InfraError::from)?;
        tokio::fs::write(&tmp, body).await.map_err(io_error)?;
        tokio::fs::rename(&tmp, &path).await.map_err(io_error)?;

        debug!(path = %path.display(), points = entry.data.len(), "Chart cache entry stored");
        Ok(())
    }
}
