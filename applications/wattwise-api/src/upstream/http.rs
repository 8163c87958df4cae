use super::{ReadingQuery, ReadingSource};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use wattwise_analytics::{readings_from_json, Reading};

#[derive(Debug, Deserialize)]
struct Summary {
    total_rows: u64,
}

/// Client for the household readings API.
#[derive(Debug, Clone)]
pub struct HttpReadingSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpReadingSource {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_text(&self, path: &str, params: &[(&str, String)]) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).query(params).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AppError::Upstream {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl ReadingSource for HttpReadingSource {
    async fn fetch(&self, query: &ReadingQuery) -> Result<Vec<Reading>> {
        let mut params = Vec::new();
        if let Some(consumer_id) = query.consumer_id {
            params.push(("user_id", consumer_id.to_string()));
        }
        if let Some(metric) = query.metric {
            params.push(("columns", format!("datetime,{}", metric.field_name())));
        }

        let body = self.get_text("/api/full_query", &params).await?;
        let readings = readings_from_json(&body)?;
        debug!(count = readings.len(), "Fetched readings");
        Ok(readings)
    }

    async fn total_rows(&self) -> Result<u64> {
        let body = self.get_text("/api/summary", &[]).await?;
        let summary: Summary = serde_json::from_str(&body)?;
        Ok(summary.total_rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let source = HttpReadingSource::new("http://127.0.0.1:5000/", 5).unwrap();
        assert_eq!(source.base_url, "http://127.0.0.1:5000");
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_request_error() {
        // Port 9 (discard) is closed on test hosts.
        let source = HttpReadingSource::new("http://127.0.0.1:9", 1).unwrap();
        let err = source.fetch(&ReadingQuery::all()).await.unwrap_err();
        assert!(matches!(err, AppError::Request(_)));
    }
}
