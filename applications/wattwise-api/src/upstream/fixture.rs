use super::{ReadingQuery, ReadingSource};
use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;
use wattwise_analytics::{readings_from_json, Reading};

/// Readings held in memory, for local runs and tests.
#[derive(Debug, Clone, Default)]
pub struct FixtureReadingSource {
    readings: Vec<Reading>,
}

impl FixtureReadingSource {
    pub fn new(readings: Vec<Reading>) -> Self {
        Self { readings }
    }

    /// Load a JSON array in the readings API format.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await?;
        Ok(Self::new(readings_from_json(&raw)?))
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

#[async_trait]
impl ReadingSource for FixtureReadingSource {
    /// Scopes by consumer with the same rule as [`Reading::belongs_to`];
    /// column selection is not emulated.
    async fn fetch(&self, query: &ReadingQuery) -> Result<Vec<Reading>> {
        Ok(self
            .readings
            .iter()
            .filter(|r| r.belongs_to(query.consumer_id))
            .cloned()
            .collect())
    }

    async fn total_rows(&self) -> Result<u64> {
        Ok(self.readings.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wattwise_analytics::Metric;

    fn source() -> FixtureReadingSource {
        FixtureReadingSource::new(vec![
            Reading::new("2008-01-01 00:00:00")
                .with_consumer(1)
                .with(Metric::ActivePower, 1.0),
            Reading::new("2008-01-01 00:01:00")
                .with_consumer(2)
                .with(Metric::ActivePower, 2.0),
        ])
    }

    #[test]
    fn test_fetch_scopes_by_consumer() {
        let source = source();
        let all = tokio_test::block_on(source.fetch(&ReadingQuery::all())).unwrap();
        let second =
            tokio_test::block_on(source.fetch(&ReadingQuery::for_consumer(Some(2)))).unwrap();

        assert_eq!(all.len(), 2);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].consumer_id, Some(2));
        assert_eq!(tokio_test::block_on(source.total_rows()).unwrap(), 2);
    }

    #[tokio::test]
    async fn test_readings_without_consumer_stay_in_scope() {
        let mut readings = source().readings;
        readings.push(Reading::new("2008-01-01 00:02:00").with(Metric::ActivePower, 3.0));
        let source = FixtureReadingSource::new(readings);

        let second = source
            .fetch(&ReadingQuery::for_consumer(Some(2)))
            .await
            .unwrap();
        let ids: Vec<Option<i64>> = second.iter().map(|r| r.consumer_id).collect();
        assert_eq!(ids, vec![Some(2), None]);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let err = FixtureReadingSource::from_file("/nonexistent/readings.json")
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::AppError::Io(_)));
    }
}
