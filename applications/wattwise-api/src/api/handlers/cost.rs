use crate::api::models::{AnnualCostResponse, Availability, YearParams};
use crate::api::AppState;
use crate::error::Result;
use crate::upstream::ReadingQuery;
use axum::{
    extract::{Query, State},
    response::Json,
};
use wattwise_analytics::{
    annual_stats, cost_overview, latest_year, metric_changes, project_annual_costs, AnnualStats,
    MetricChanges,
};

pub async fn get_annual(
    State(state): State<AppState>,
    Query(params): Query<YearParams>,
) -> Result<Json<AnnualCostResponse>> {
    let cost_per_kwh = state.config.tariff.cost_per_kwh;
    let readings = state
        .source
        .fetch(&ReadingQuery::for_consumer(params.consumer_id))
        .await?;

    let costs = project_annual_costs(&readings, cost_per_kwh);
    Ok(Json(AnnualCostResponse {
        available: !costs.is_empty(),
        cost_per_kwh,
        overview: cost_overview(&readings, cost_per_kwh),
        costs,
    }))
}

pub async fn get_metric_changes(
    State(state): State<AppState>,
    Query(params): Query<YearParams>,
) -> Result<Json<Availability<MetricChanges>>> {
    let readings = state
        .source
        .fetch(&ReadingQuery::for_consumer(params.consumer_id))
        .await?;

    Ok(Json(metric_changes(&readings).into()))
}

pub async fn get_annual_stats(
    State(state): State<AppState>,
    Query(params): Query<YearParams>,
) -> Result<Json<Availability<AnnualStats>>> {
    let rate = state.config.tariff.stats_rate_per_kwh;
    let readings = state
        .source
        .fetch(&ReadingQuery::for_consumer(params.consumer_id))
        .await?;

    let stats = params
        .year
        .or_else(|| latest_year(&readings))
        .map(|year| annual_stats(&readings, year, rate));

    Ok(Json(stats.into()))
}
