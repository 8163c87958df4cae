use crate::api::models::{Availability, CalendarResponse, UsageParams, YearParams};
use crate::api::AppState;
use crate::error::Result;
use crate::upstream::ReadingQuery;
use axum::{
    extract::{Query, State},
    response::Json,
};
use tracing::debug;
use wattwise_analytics::{
    available_days, available_months, available_years, chart_series, latest_year, metric_totals,
    ChartSeries, MetricBreakdown,
};

pub async fn get_series(
    State(state): State<AppState>,
    Query(params): Query<UsageParams>,
) -> Result<Json<ChartSeries>> {
    let filter = params.filter()?;
    let metric = params.metric()?;

    let query = ReadingQuery::for_consumer(params.consumer_id).with_metric(metric);
    let readings = state.source.fetch(&query).await?;
    let series = chart_series(&readings, &filter, metric);
    debug!(metric = %metric, buckets = series.labels.len(), "Built usage series");

    Ok(Json(series))
}

pub async fn get_breakdown(
    State(state): State<AppState>,
    Query(params): Query<YearParams>,
) -> Result<Json<Availability<MetricBreakdown>>> {
    let readings = state
        .source
        .fetch(&ReadingQuery::for_consumer(params.consumer_id))
        .await?;

    let breakdown = params
        .year
        .or_else(|| latest_year(&readings))
        .map(|year| metric_totals(&readings, year));

    Ok(Json(breakdown.into()))
}

pub async fn get_calendar(
    State(state): State<AppState>,
    Query(params): Query<UsageParams>,
) -> Result<Json<CalendarResponse>> {
    params.filter()?;
    let readings = state
        .source
        .fetch(&ReadingQuery::for_consumer(params.consumer_id))
        .await?;

    let months = params.year.map(|year| available_months(&readings, year));
    let days = params
        .year
        .zip(params.month)
        .map(|(year, month)| available_days(&readings, year, month));

    Ok(Json(CalendarResponse {
        years: available_years(&readings),
        months,
        days,
    }))
}
