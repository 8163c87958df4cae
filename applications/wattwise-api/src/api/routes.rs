use crate::api::handlers::{billing, cost, health, insights, readings, usage};
use crate::api::AppState;
use crate::config::Config;
use crate::upstream::SharedSource;
use axum::{extract::Request, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::Level;

pub fn create_router(source: SharedSource, config: Config) -> Router {
    let state = AppState {
        source,
        config: Arc::new(config),
    };

    let public_routes = Router::new().route("/health", get(health::health));

    let api_routes = Router::new()
        .route("/api/v1/readings", get(readings::get_readings))
        .route("/api/v1/usage/series", get(usage::get_series))
        .route("/api/v1/usage/breakdown", get(usage::get_breakdown))
        .route("/api/v1/usage/calendar", get(usage::get_calendar))
        .route("/api/v1/billing", get(billing::get_billing))
        .route("/api/v1/cost/annual", get(cost::get_annual))
        .route("/api/v1/cost/metric-changes", get(cost::get_metric_changes))
        .route("/api/v1/cost/annual-stats", get(cost::get_annual_stats))
        .route("/api/v1/insights", get(insights::get_insights));

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .with_state(state)
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request| {
                    tracing::span!(
                        Level::INFO,
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                })
                .on_request(|_request: &Request, _span: &tracing::Span| {
                    tracing::event!(Level::DEBUG, "received request");
                })
                .on_response(
                    |response: &axum::response::Response,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::event!(
                            Level::INFO,
                            status = response.status().as_u16(),
                            latency = ?latency,
                            "request completed"
                        );
                    },
                )
                .on_failure(
                    |_error: tower_http::classify::ServerErrorsFailureClass,
                     _latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::event!(Level::ERROR, "request failed");
                    },
                ),
        )
}
