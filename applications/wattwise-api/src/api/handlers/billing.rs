use crate::api::models::{Availability, BillingParams};
use crate::api::AppState;
use crate::error::Result;
use crate::upstream::ReadingQuery;
use axum::{
    extract::{Query, State},
    response::Json,
};
use wattwise_analytics::{calculate_billing, latest_billing, BillingSummary};

/// Bill `billing_month`, or the latest month with data when it is omitted.
pub async fn get_billing(
    State(state): State<AppState>,
    Query(params): Query<BillingParams>,
) -> Result<Json<Availability<BillingSummary>>> {
    let month = params.billing_month()?;
    let rate = state.config.tariff.billing_rate_per_kwh;

    let readings = state
        .source
        .fetch(&ReadingQuery::for_consumer(params.consumer_id))
        .await?;

    let summary = match month {
        Some(month) => calculate_billing(&readings, month, rate),
        None => latest_billing(&readings, rate),
    };

    Ok(Json(summary.map(|s| s.rounded()).into()))
}
