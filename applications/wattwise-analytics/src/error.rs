use thiserror::Error;

/// Caller errors. Data-shape problems inside a reading set never surface here;
/// those records are skipped instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyticsError {
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),
    #[error("Invalid month '{0}': expected YYYY-MM")]
    InvalidMonth(String),
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
    #[error("Invalid date range: {0}")]
    InvalidRange(String),
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
