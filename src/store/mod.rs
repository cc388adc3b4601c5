use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;

pub mod postgres;

/// A row in the `api_keys` table.
///
/// `key` is an opaque bearer credential; no structure is assumed beyond
/// global uniqueness. `usage_limit` serializes as `limit` to match the
/// dashboard's field name.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ApiKey {
    pub id: Uuid,
    pub name: String,
    pub key: String,
    pub usage: i32,
    #[serde(rename = "limit")]
    pub usage_limit: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewApiKey {
    pub name: String,
    pub key: String,
    pub usage_limit: i32,
}

/// Persistence seam for issued API keys.
///
/// `PgStore` is the production implementation; tests swap in an in-memory
/// fake so the HTTP layer can be exercised without a database.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Exact-match lookup on the opaque key string. `Ok(None)` means the
    /// key does not exist; infrastructure failures surface as `Err` so
    /// they are never mistaken for a bad key.
    async fn find_by_key(&self, key: &str) -> Result<Option<ApiKey>, AppError>;

    async fn insert_key(&self, new: &NewApiKey) -> Result<ApiKey, AppError>;

    /// List issued keys, newest first.
    async fn list_keys(&self) -> Result<Vec<ApiKey>, AppError>;

    /// Returns false when no row matched the id.
    async fn rename_key(&self, id: Uuid, name: &str) -> Result<bool, AppError>;

    /// Returns false when no row matched the id.
    async fn delete_key(&self, id: Uuid) -> Result<bool, AppError>;

    /// Bump the usage counter after a successful summarization.
    async fn record_usage(&self, id: Uuid) -> Result<(), AppError>;
}
