use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("API key is required")]
    MissingApiKey,

    #[error("GitHub URL is required")]
    MissingGithubUrl,

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("malformed GitHub repository URL")]
    MalformedUrl,

    #[error("README not found")]
    ReadmeNotFound,

    #[error("README source unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("model output violated the summary schema: {0}")]
    SchemaViolation(String),

    #[error("model backend unavailable: {0}")]
    ModelUnavailable(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Collapse fetch/summarize failures into the generic 500 the public
    /// contract promises. Input and authentication errors pass through
    /// untouched; `verbose_upstream_errors` opts out of the collapse.
    pub fn flatten_upstream(self) -> Self {
        match self {
            AppError::MalformedUrl
            | AppError::ReadmeNotFound
            | AppError::UpstreamUnavailable(_)
            | AppError::SchemaViolation(_)
            | AppError::ModelUnavailable(_) => AppError::Internal(anyhow::Error::new(self)),
            other => other,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self {
            AppError::MissingApiKey => (StatusCode::BAD_REQUEST, "API key is required".to_string()),
            AppError::MissingGithubUrl => {
                (StatusCode::BAD_REQUEST, "GitHub URL is required".to_string())
            }
            AppError::InvalidApiKey => (StatusCode::NOT_FOUND, "Invalid API key".to_string()),
            // The variants below only reach the wire when
            // `verbose_upstream_errors` is enabled; the compatible default
            // flattens them into `Internal` first.
            AppError::MalformedUrl => (
                StatusCode::BAD_REQUEST,
                "Malformed GitHub repository URL".to_string(),
            ),
            AppError::ReadmeNotFound => (StatusCode::NOT_FOUND, "README not found".to_string()),
            AppError::UpstreamUnavailable(e) => {
                tracing::warn!("README upstream failure: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "README source unavailable".to_string(),
                )
            }
            AppError::SchemaViolation(e) => {
                tracing::error!("Schema violation from model: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "Model returned malformed output".to_string(),
                )
            }
            AppError::ModelUnavailable(e) => {
                tracing::error!("Model backend failure: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "Model backend unavailable".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": msg }))).into_response()
    }
}
