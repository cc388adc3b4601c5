use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{ApiKey, KeyStore, NewApiKey};
use crate::errors::AppError;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run pending migrations from the migrations/ directory.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyStore for PgStore {
    async fn find_by_key(&self, key: &str) -> Result<Option<ApiKey>, AppError> {
        let row = sqlx::query_as::<_, ApiKey>(
            "SELECT id, name, key, usage, usage_limit, created_at FROM api_keys WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn insert_key(&self, new: &NewApiKey) -> Result<ApiKey, AppError> {
        let row = sqlx::query_as::<_, ApiKey>(
            r#"INSERT INTO api_keys (name, key, usage_limit)
               VALUES ($1, $2, $3)
               RETURNING id, name, key, usage, usage_limit, created_at"#,
        )
        .bind(&new.name)
        .bind(&new.key)
        .bind(new.usage_limit)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_keys(&self) -> Result<Vec<ApiKey>, AppError> {
        let rows = sqlx::query_as::<_, ApiKey>(
            "SELECT id, name, key, usage, usage_limit, created_at FROM api_keys ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn rename_key(&self, id: Uuid, name: &str) -> Result<bool, AppError> {
        let result =
            sqlx::query("UPDATE api_keys SET name = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(name)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_key(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM api_keys WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn record_usage(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE api_keys SET usage = usage + 1, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
