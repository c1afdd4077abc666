//! Pluggable usage data sources.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::ValueEnum;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::types::{UsageFile, UsageMetric, UsageSnapshot};
use crate::error::FetchError;

/// Anything that can produce a usage snapshot
pub trait UsageSource: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Fetch the current usage snapshot
    fn fetch(&self) -> BoxFuture<'_, Result<UsageSnapshot, FetchError>>;
}

/// Shared, type-erased source
pub type SharedSource = Arc<dyn UsageSource>;

/// Fixed demo values
#[derive(Debug, Clone, Default)]
pub struct MockSource;

impl MockSource {
    /// The demo snapshot (also used as the fallback substitute)
    pub fn snapshot() -> UsageSnapshot {
        UsageSnapshot {
            session: UsageMetric {
                percent_used: 15.0,
                reset_at: None,
                reset_info: Some("1am (America/Chicago)".to_string()),
            },
            weekly: UsageMetric {
                percent_used: 11.0,
                reset_at: None,
                reset_info: Some("Jan 15, 6am (America/Chicago)".to_string()),
            },
            weekly_secondary: Some(UsageMetric {
                percent_used: 0.0,
                reset_at: None,
                reset_info: Some("Jan 15, 6am (America/Chicago)".to_string()),
            }),
        }
    }
}

impl UsageSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    fn fetch(&self) -> BoxFuture<'_, Result<UsageSnapshot, FetchError>> {
        async { Ok(Self::snapshot()) }.boxed()
    }
}

/// Reads the persisted usage file (`{ lastUpdated, claude }`)
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location: `<config_dir>/aibattery/usage-data.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("aibattery").join("usage-data.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the file
    pub async fn read(&self) -> Result<UsageFile, FetchError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| FetchError::Io {
                path: self.path.clone(),
                source,
            })?;
        serde_json::from_str(&content).map_err(|source| FetchError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

impl UsageSource for FileSource {
    fn name(&self) -> &str {
        "file"
    }

    fn fetch(&self) -> BoxFuture<'_, Result<UsageSnapshot, FetchError>> {
        async move {
            let file = self.read().await?;
            debug!(
                "Read usage file {:?} (last updated {:?})",
                self.path, file.last_updated
            );
            Ok(file.claude)
        }
        .boxed()
    }
}

/// What to do when the underlying source fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FallbackMode {
    /// Surface the error
    #[default]
    Fail,
    /// Substitute the demo snapshot
    Demo,
}

/// Substitutes the demo snapshot when the inner source fails
pub struct FallbackSource {
    inner: SharedSource,
    fallback: UsageSnapshot,
}

impl FallbackSource {
    pub fn new(inner: SharedSource) -> Self {
        Self {
            inner,
            fallback: MockSource::snapshot(),
        }
    }
}

impl UsageSource for FallbackSource {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn fetch(&self) -> BoxFuture<'_, Result<UsageSnapshot, FetchError>> {
        async move {
            match self.inner.fetch().await {
                Ok(snapshot) => Ok(snapshot),
                Err(e) => {
                    warn!(
                        "Usage source '{}' failed, showing demo data: {}",
                        self.inner.name(),
                        e
                    );
                    Ok(self.fallback.clone())
                }
            }
        }
        .boxed()
    }
}

/// Wrap a source according to the fallback mode
pub fn apply_fallback(source: SharedSource, mode: FallbackMode) -> SharedSource {
    match mode {
        FallbackMode::Fail => source,
        FallbackMode::Demo => Arc::new(FallbackSource::new(source)),
    }
}
