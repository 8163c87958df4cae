use serde::Serialize;
use wattwise_analytics::{AnnualCost, CostOverview, ReadingPage};

/// Wraps a result that may be undefined for the data at hand. Renders as
/// `{"available": false}` or `{"available": true, ...fields}`.
#[derive(Debug, Serialize)]
pub struct Availability<T: Serialize> {
    pub available: bool,
    #[serde(flatten)]
    pub result: Option<T>,
}

impl<T: Serialize> From<Option<T>> for Availability<T> {
    fn from(result: Option<T>) -> Self {
        Self {
            available: result.is_some(),
            result,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub upstream: UpstreamHealth,
}

#[derive(Debug, Serialize)]
pub struct UpstreamHealth {
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_rows: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub years: Vec<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub months: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<Vec<u32>>,
}

/// A page of the raw readings table. `total_rows` is the upstream row count,
/// before any filter.
#[derive(Debug, Serialize)]
pub struct ReadingsResponse {
    pub total_rows: u64,
    #[serde(flatten)]
    pub page: ReadingPage,
}

#[derive(Debug, Serialize)]
pub struct AnnualCostResponse {
    pub available: bool,
    pub cost_per_kwh: f64,
    pub costs: Vec<AnnualCost>,
    pub overview: Option<CostOverview>,
}
