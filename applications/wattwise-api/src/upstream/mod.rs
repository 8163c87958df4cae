mod fixture;
mod http;

pub use fixture::FixtureReadingSource;
pub use http::HttpReadingSource;

use crate::config::UpstreamConfig;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;
use wattwise_analytics::{Metric, Reading};

/// What to ask the readings API for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadingQuery {
    /// Sent as `user_id`.
    pub consumer_id: Option<i64>,
    /// Restricts the payload to `datetime` plus this column.
    pub metric: Option<Metric>,
}

impl ReadingQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_consumer(consumer_id: Option<i64>) -> Self {
        Self {
            consumer_id,
            metric: None,
        }
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = Some(metric);
        self
    }
}

#[async_trait]
pub trait ReadingSource: Send + Sync {
    async fn fetch(&self, query: &ReadingQuery) -> Result<Vec<Reading>>;

    /// Number of rows the source holds.
    async fn total_rows(&self) -> Result<u64>;
}

pub type SharedSource = Arc<dyn ReadingSource>;

/// Build the configured source. A fixture file wins over a base URL.
pub async fn from_config(cfg: &UpstreamConfig) -> Result<SharedSource> {
    if let Some(path) = &cfg.fixture_path {
        let source = FixtureReadingSource::from_file(path).await?;
        info!(path = %path.display(), readings = source.len(), "Serving readings from fixture");
        return Ok(Arc::new(source));
    }

    let base_url = cfg.base_url.as_deref().ok_or_else(|| {
        AppError::Config("upstream requires either base_url or fixture_path".into())
    })?;
    info!(base_url, timeout_secs = cfg.timeout_secs, "Using upstream readings API");
    Ok(Arc::new(HttpReadingSource::new(base_url, cfg.timeout_secs)?))
}
