use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::errors::AppError;
use crate::keys;
use crate::store::{ApiKey, NewApiKey};
use crate::AppState;

// ── Request / Response DTOs ──────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeRequest {
    pub github_url: Option<String>,
}

#[derive(Serialize)]
pub struct SummarizeResponse {
    pub message: String,
    pub url: String,
    pub summary: String,
    #[serde(rename = "coolFacts")]
    pub cool_facts: Vec<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ValidateKeyRequest {
    pub api_key: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateKeyRequest {
    pub name: String,
    pub limit: Option<i32>,
}

#[derive(Deserialize)]
pub struct RenameKeyRequest {
    pub name: String,
}

// ── Handlers ─────────────────────────────────────────────────

/// POST /api/github-summarizer — the key-gated summarization pipeline.
///
/// Field-check order is part of the contract: the API key header is
/// inspected before the body, so an empty body with no key reports the
/// missing key, not the missing URL. By default every fetch/summarize
/// failure leaves as the generic 500.
pub async fn summarize_github(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SummarizeResponse>, AppError> {
    let verbose = state.config.verbose_upstream_errors;
    run_pipeline(&state, &headers, &body).await.map_err(|e| {
        if verbose {
            e
        } else {
            e.flatten_upstream()
        }
    })
}

/// Strictly sequential: receive → authenticate → fetch → summarize →
/// respond. No stage is retried; the first failure is terminal.
async fn run_pipeline(
    state: &AppState,
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<Json<SummarizeResponse>, AppError> {
    // -- 1. Receive request --
    let api_key = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if api_key.is_empty() {
        return Err(AppError::MissingApiKey);
    }

    // A body that is not JSON reads the same as a body with no URL.
    let request: SummarizeRequest = serde_json::from_slice(body).unwrap_or_default();
    let github_url = request
        .github_url
        .filter(|u| !u.is_empty())
        .ok_or(AppError::MissingGithubUrl)?;

    // -- 2. Authenticate key --
    let key = keys::validate(state.db.as_ref(), api_key).await?;
    tracing::debug!(key_id = %key.id, url = %github_url, "summarization request authenticated");

    // -- 3. Fetch README --
    let readme = state.readme.fetch(&github_url).await?;

    // -- 4. Summarize --
    let summary = state.model.summarize(&readme).await?;

    // Usage accounting is best-effort; the response never fails on it.
    if let Err(e) = state.db.record_usage(key.id).await {
        tracing::warn!(key_id = %key.id, error = %e, "failed to record key usage");
    }

    // -- 5. Respond --
    Ok(Json(SummarizeResponse {
        message: "GitHub summarization completed".to_string(),
        url: github_url,
        summary: summary.summary,
        cool_facts: summary.cool_facts,
    }))
}

/// POST /api/validate-key — existence check used by the dashboard's
/// protected-page gate. Responds 401 for an unknown key (not the
/// summarizer's 404); historical contract, kept as-is.
pub async fn validate_key(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let request: ValidateKeyRequest = serde_json::from_slice(&body).unwrap_or_default();
    let candidate = request.api_key.unwrap_or_default();

    match keys::validate(state.db.as_ref(), &candidate).await {
        Ok(_) => Json(json!({ "valid": true })).into_response(),
        Err(AppError::InvalidApiKey) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid API key" })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/keys — list issued keys, newest first
pub async fn list_keys(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ApiKey>>, StatusCode> {
    let rows = state.db.list_keys().await.map_err(|e| {
        tracing::error!("list_keys failed: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(rows))
}

/// POST /api/keys — mint a new key; the full key string is returned once
pub async fn create_key(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateKeyRequest>,
) -> Result<(StatusCode, Json<ApiKey>), StatusCode> {
    let limit = payload.limit.unwrap_or(1000);
    if payload.name.trim().is_empty() || limit <= 0 {
        return Err(StatusCode::BAD_REQUEST);
    }

    let new = NewApiKey {
        name: payload.name,
        key: keys::generate_key(),
        usage_limit: limit,
    };

    let row = state.db.insert_key(&new).await.map_err(|e| {
        tracing::error!("create_key failed: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok((StatusCode::CREATED, Json(row)))
}

/// PUT /api/keys/:id — rename a key
pub async fn rename_key(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RenameKeyRequest>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    if payload.name.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let updated = state.db.rename_key(id, &payload.name).await.map_err(|e| {
        tracing::error!("rename_key failed: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    if !updated {
        return Err(StatusCode::NOT_FOUND);
    }

    Ok(Json(json!({ "id": id, "name": payload.name })))
}

/// DELETE /api/keys/:id — remove a key
pub async fn delete_key(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    let deleted = state.db.delete_key(id).await.map_err(|e| {
        tracing::error!("delete_key failed: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}
