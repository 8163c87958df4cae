use crate::api::models::{ReadingsParams, ReadingsResponse};
use crate::api::AppState;
use crate::error::Result;
use crate::upstream::ReadingQuery;
use axum::{
    extract::{Query, State},
    response::Json,
};
use tracing::debug;
use wattwise_analytics::reading_page;

pub async fn get_readings(
    State(state): State<AppState>,
    Query(params): Query<ReadingsParams>,
) -> Result<Json<ReadingsResponse>> {
    let filter = params.filter()?;
    let page = params.page()?;
    let columns = params.columns()?;

    let readings = state
        .source
        .fetch(&ReadingQuery::for_consumer(params.consumer_id))
        .await?;
    let total_rows = state.source.total_rows().await?;

    let page = reading_page(&readings, &filter, &columns, page);
    debug!(
        offset = page.offset,
        rows = page.rows.len(),
        matched = page.matched_rows,
        "Built readings page"
    );

    Ok(Json(ReadingsResponse { total_rows, page }))
}
