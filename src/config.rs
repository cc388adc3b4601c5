#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// Gate for the key-management API. Unset means key management is
    /// disabled (requests fail with 500 until an operator configures it).
    pub admin_key: Option<String>,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub model: String,
    pub github_base_url: String,
    /// Optional token for the README fetch; raises GitHub's rate limits.
    pub github_token: Option<String>,
    pub fetch_timeout_secs: u64,
    pub model_timeout_secs: u64,
    /// Re-prompt attempts after a schema violation. 0 restores the
    /// single-shot behaviour.
    pub schema_retries: u32,
    /// When set, fetch/summarize failures surface with distinct status
    /// codes instead of the backward-compatible generic 500.
    pub verbose_upstream_errors: bool,
    pub dashboard_origin: String,
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let openai_api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
    if openai_api_key.is_empty() {
        let env_mode = std::env::var("GITDIGEST_ENV")
            .or_else(|_| std::env::var("RUST_ENV"))
            .unwrap_or_default();
        if env_mode == "production" {
            anyhow::bail!(
                "OPENAI_API_KEY is not set. The summarizer cannot run \
                 without a model backend credential."
            );
        }
        eprintln!("⚠️  OPENAI_API_KEY is not set — summarization requests will fail until it is configured.");
    }

    Ok(Config {
        port: std::env::var("GITDIGEST_PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .unwrap_or(8080),
        database_url: std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/gitdigest".into()),
        admin_key: std::env::var("GITDIGEST_ADMIN_KEY").ok(),
        openai_api_key,
        openai_base_url: std::env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".into()),
        model: std::env::var("GITDIGEST_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".into()),
        github_base_url: std::env::var("GITDIGEST_GITHUB_API")
            .unwrap_or_else(|_| "https://api.github.com".into()),
        github_token: std::env::var("GITHUB_TOKEN").ok(),
        fetch_timeout_secs: std::env::var("GITDIGEST_FETCH_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10),
        model_timeout_secs: std::env::var("GITDIGEST_MODEL_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30),
        schema_retries: std::env::var("GITDIGEST_SCHEMA_RETRIES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1),
        verbose_upstream_errors: std::env::var("GITDIGEST_VERBOSE_ERRORS")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false),
        dashboard_origin: std::env::var("DASHBOARD_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".into()),
    })
}
