use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use wattwise_analytics::AnalyticsError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Upstream request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(#[from] AnalyticsError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InvalidInput(ref e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::Request(ref e) => {
                tracing::error!("Upstream request error: {:?}", e);
                (StatusCode::BAD_GATEWAY, "Readings API unavailable".to_string())
            }
            AppError::Upstream { status, ref message } => {
                tracing::error!(status, "Upstream error: {}", message);
                (StatusCode::BAD_GATEWAY, "Readings API returned an error".to_string())
            }
            AppError::Json(ref e) => {
                tracing::error!("Malformed readings payload: {:?}", e);
                (StatusCode::BAD_GATEWAY, "Invalid readings payload".to_string())
            }
            AppError::Config(ref msg) => {
                tracing::error!("Config error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::Io(ref e) => {
                tracing::error!("IO error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::Other(ref e) => {
                tracing::error!("Internal error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let bad_month = AppError::from(AnalyticsError::InvalidMonth("2008-13".into()));
        assert_eq!(bad_month.into_response().status(), StatusCode::BAD_REQUEST);

        let upstream = AppError::Upstream {
            status: 503,
            message: "maintenance".into(),
        };
        assert_eq!(upstream.into_response().status(), StatusCode::BAD_GATEWAY);

        let config = AppError::Config("no source".into());
        assert_eq!(config.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
