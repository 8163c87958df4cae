use crate::api::models::{Availability, InsightParams};
use crate::api::AppState;
use crate::error::Result;
use crate::upstream::ReadingQuery;
use axum::{
    extract::{Query, State},
    response::Json,
};
use wattwise_analytics::{insight_report, recent_month_range, InsightReport};

/// Peak period and per-metric insights. Without `from`/`to` the month of the
/// latest reading is used.
pub async fn get_insights(
    State(state): State<AppState>,
    Query(params): Query<InsightParams>,
) -> Result<Json<Availability<InsightReport>>> {
    let requested = params.range()?;
    let readings = state
        .source
        .fetch(&ReadingQuery::for_consumer(params.consumer_id))
        .await?;

    let report = requested
        .or_else(|| recent_month_range(&readings))
        .and_then(|range| insight_report(&readings, &range));

    Ok(Json(report.into()))
}
