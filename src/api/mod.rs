use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub mod handlers;

/// Build the full application router.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        // Health endpoints (no auth)
        .route("/healthz", get(|| async { "ok" }))
        .route("/readyz", get(readiness_check))
        // Key-gated summarization pipeline
        .route("/api/github-summarizer", post(handlers::summarize_github))
        // Existence check used by the dashboard's protected-page gate
        .route("/api/validate-key", post(handlers::validate_key))
        // Key management — admin-gated
        .nest("/api/keys", keys_router(state.clone()))
        .with_state(state.clone())
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.dashboard_origin))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(middleware::from_fn(security_headers_middleware))
}

fn keys_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::list_keys).post(handlers::create_key))
        .route(
            "/:id",
            axum::routing::put(handlers::rename_key).delete(handlers::delete_key),
        )
        .layer(middleware::from_fn_with_state(state, admin_auth))
}

async fn readiness_check() -> &'static str {
    "ok"
}

/// Restrict CORS to the dashboard origin (plus localhost for dev).
fn cors_layer(dashboard_origin: &str) -> CorsLayer {
    use axum::http::{HeaderName, Method};
    use tower_http::cors::AllowOrigin;

    let origin = dashboard_origin.to_string();
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |o, _| {
            let o = o.to_str().unwrap_or("");
            o == origin
                || o.starts_with("http://localhost:")
                || o.starts_with("http://127.0.0.1:")
        }))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("x-api-key"),
            HeaderName::from_static("x-admin-key"),
            HeaderName::from_static("x-request-id"),
        ])
        .allow_credentials(true)
}

/// Middleware: validates `x-admin-key` against the configured admin key.
/// Key management is the dashboard's surface, never gated by tenant keys.
/// Returns 401 if missing/invalid, 500 if no admin key is configured.
async fn admin_auth(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = state.config.admin_key.as_deref() else {
        tracing::error!("GITDIGEST_ADMIN_KEY is not set; refusing key management request");
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    };

    let provided = req
        .headers()
        .get("x-admin-key")
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            req.headers()
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(|t| t.trim())
        });

    match provided {
        Some(k) if k == expected => Ok(next.run(req).await),
        Some(k) => {
            // Never log the expected key or the full provided key
            let masked = if k.len() > 8 {
                format!("{}…{}", &k[..4], &k[k.len() - 4..])
            } else {
                "****".to_string()
            };
            tracing::warn!("key management: invalid admin key (provided: '{}')", masked);
            Err(StatusCode::UNAUTHORIZED)
        }
        None => {
            tracing::warn!("key management: missing x-admin-key header");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

/// Middleware: injects a unique X-Request-Id into every response so
/// clients can correlate errors with service logs.
async fn request_id_middleware(req: Request, next: Next) -> Response {
    let req_id = uuid::Uuid::new_v4().to_string();
    let mut resp = next.run(req).await;
    if let Ok(val) = axum::http::HeaderValue::from_str(&req_id) {
        resp.headers_mut().insert("x-request-id", val);
    }
    resp
}

/// Middleware: injects security headers into every response.
async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let mut resp = next.run(req).await;
    let headers = resp.headers_mut();

    headers.insert("X-Content-Type-Options", "nosniff".parse().unwrap());
    headers.insert("X-Frame-Options", "DENY".parse().unwrap());
    headers.insert("Cache-Control", "no-store".parse().unwrap());
    headers.insert("Referrer-Policy", "no-referrer".parse().unwrap());
    headers.remove("Server");

    resp
}
