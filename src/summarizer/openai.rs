//! OpenAI-compatible chat-completions backend.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::schema::{self, RepoSummary};
use super::{build_prompt, SummaryModel};
use crate::config::Config;
use crate::errors::AppError;

pub struct OpenAiModel {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    schema_retries: u32,
}

impl OpenAiModel {
    pub fn new(cfg: &Config) -> Self {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(Duration::from_secs(cfg.model_timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .expect("failed to build model HTTP client");

        Self {
            client,
            base_url: cfg.openai_base_url.trim_end_matches('/').to_string(),
            api_key: cfg.openai_api_key.clone(),
            model: cfg.model.clone(),
            schema_retries: cfg.schema_retries,
        }
    }

    /// One chat-completions call at temperature 0. Transport failures,
    /// non-2xx statuses, and timeouts all map to `ModelUnavailable`.
    async fn complete(&self, messages: &[Value]) -> Result<String, AppError> {
        let url = format!("{}/chat/completions", self.base_url);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": self.model,
                "temperature": 0,
                "messages": messages,
            }))
            .send()
            .await
            .map_err(|e| AppError::ModelUnavailable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %body, "model backend returned an error");
            return Err(AppError::ModelUnavailable(format!(
                "model backend returned HTTP {}",
                status
            )));
        }

        let raw: Value = resp
            .json()
            .await
            .map_err(|e| AppError::ModelUnavailable(e.to_string()))?;

        raw.get("choices")
            .and_then(|c| c.as_array())
            .and_then(|a| a.first())
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(str::to_owned)
            .ok_or_else(|| {
                AppError::ModelUnavailable("model reply carried no message content".into())
            })
    }
}

#[async_trait]
impl SummaryModel for OpenAiModel {
    /// Extract a schema-validated summary. On a schema violation the reply
    /// and the violation are fed back for up to `schema_retries` further
    /// passes; transport failures are never retried.
    async fn summarize(&self, readme: &str) -> Result<RepoSummary, AppError> {
        let mut messages = vec![serde_json::json!({
            "role": "user",
            "content": build_prompt(readme),
        })];

        let mut last_violation = String::new();
        for attempt in 0..=self.schema_retries {
            let reply = self.complete(&messages).await?;
            match schema::parse_summary(&reply) {
                Ok(summary) => return Ok(summary),
                Err(AppError::SchemaViolation(detail)) => {
                    tracing::warn!(attempt, detail = %detail, "model reply failed schema validation");
                    messages.push(serde_json::json!({
                        "role": "assistant",
                        "content": reply,
                    }));
                    messages.push(serde_json::json!({
                        "role": "user",
                        "content": format!(
                            "Your previous answer did not satisfy the schema: {}. \
                             Answer again with only the raw JSON object.",
                            detail
                        ),
                    }));
                    last_violation = detail;
                }
                Err(other) => return Err(other),
            }
        }

        Err(AppError::SchemaViolation(last_violation))
    }
}
