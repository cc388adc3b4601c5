//! Shared fixtures: an in-memory key store and a router wired to
//! wiremock upstreams, so the HTTP layer runs without Postgres.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use tower::ServiceExt;
use uuid::Uuid;

use gitdigest::config::Config;
use gitdigest::errors::AppError;
use gitdigest::github::ReadmeFetcher;
use gitdigest::store::{ApiKey, KeyStore, NewApiKey};
use gitdigest::summarizer::openai::OpenAiModel;
use gitdigest::{api, AppState};

pub struct MemoryKeyStore {
    rows: Mutex<Vec<ApiKey>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
        }
    }

    /// A store seeded with one known key.
    pub fn with_key(key: &str) -> Self {
        let store = Self::new();
        store.rows.lock().unwrap().push(ApiKey {
            id: Uuid::new_v4(),
            name: "seeded".into(),
            key: key.into(),
            usage: 0,
            usage_limit: 1000,
            created_at: Utc::now(),
        });
        store
    }

    pub fn usage_of(&self, key: &str) -> Option<i32> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|k| k.key == key)
            .map(|k| k.usage)
    }

    pub fn first_id(&self) -> Option<Uuid> {
        self.rows.lock().unwrap().first().map(|k| k.id)
    }
}

#[async_trait]
impl KeyStore for MemoryKeyStore {
    async fn find_by_key(&self, key: &str) -> Result<Option<ApiKey>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|k| k.key == key)
            .cloned())
    }

    async fn insert_key(&self, new: &NewApiKey) -> Result<ApiKey, AppError> {
        let row = ApiKey {
            id: Uuid::new_v4(),
            name: new.name.clone(),
            key: new.key.clone(),
            usage: 0,
            usage_limit: new.usage_limit,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().insert(0, row.clone());
        Ok(row)
    }

    async fn list_keys(&self) -> Result<Vec<ApiKey>, AppError> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn rename_key(&self, id: Uuid, name: &str) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|k| k.id == id) {
            Some(row) => {
                row.name = name.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_key(&self, id: Uuid) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|k| k.id != id);
        Ok(rows.len() < before)
    }

    async fn record_usage(&self, id: Uuid) -> Result<(), AppError> {
        if let Some(row) = self.rows.lock().unwrap().iter_mut().find(|k| k.id == id) {
            row.usage += 1;
        }
        Ok(())
    }
}

pub fn test_config(github_base: &str, openai_base: &str) -> Config {
    Config {
        port: 0,
        database_url: String::new(),
        admin_key: Some("admin-secret".into()),
        openai_api_key: "sk-test".into(),
        openai_base_url: openai_base.into(),
        model: "gpt-3.5-turbo".into(),
        github_base_url: github_base.into(),
        github_token: None,
        fetch_timeout_secs: 5,
        model_timeout_secs: 5,
        schema_retries: 1,
        verbose_upstream_errors: false,
        dashboard_origin: "http://localhost:3000".into(),
    }
}

pub fn app_with(store: Arc<MemoryKeyStore>, cfg: Config) -> Router {
    let state = Arc::new(AppState {
        db: store,
        readme: ReadmeFetcher::new(&cfg),
        model: Arc::new(OpenAiModel::new(&cfg)),
        config: cfg,
    });
    api::app(state)
}

/// Fire one request at the router and decode the JSON body (if any).
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    headers: &[(&str, &str)],
    body: &str,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }

    let resp = app
        .clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();

    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// An OpenAI chat-completions envelope whose first choice carries `content`.
pub fn chat_reply(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}
