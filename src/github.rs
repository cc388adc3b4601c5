//! README retrieval from the GitHub content API.

use std::time::Duration;

use reqwest::header;
use reqwest::StatusCode;

use crate::config::Config;
use crate::errors::AppError;

/// Owner/repo pair derived from a repository URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

/// Derive owner/repo by strict positional path-segment extraction:
/// owner is the 4th `/`-separated segment, repo the 5th
/// (`https://github.com/{owner}/{repo}[...]`). URLs that do not parse,
/// are not http(s), or leave either segment empty are rejected here,
/// before any network call.
pub fn parse_repo_url(repo_url: &str) -> Result<RepoRef, AppError> {
    let parsed = url::Url::parse(repo_url).map_err(|_| AppError::MalformedUrl)?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(AppError::MalformedUrl);
    }

    let segments: Vec<&str> = repo_url.split('/').collect();
    let owner = segments.get(3).copied().unwrap_or_default();
    let repo = segments.get(4).copied().unwrap_or_default();
    if owner.is_empty() || repo.is_empty() {
        return Err(AppError::MalformedUrl);
    }

    Ok(RepoRef {
        owner: owner.to_string(),
        repo: repo.to_string(),
    })
}

/// Fetches raw README content for a repository. One best-effort request,
/// no retries, bounded by the configured timeout.
#[derive(Clone)]
pub struct ReadmeFetcher {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ReadmeFetcher {
    pub fn new(cfg: &Config) -> Self {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .user_agent(concat!("gitdigest/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(cfg.fetch_timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .expect("failed to build GitHub HTTP client");

        Self {
            client,
            base_url: cfg.github_base_url.trim_end_matches('/').to_string(),
            token: cfg.github_token.clone(),
        }
    }

    /// GET `{base}/repos/{owner}/{repo}/readme`, requesting raw content
    /// rather than the metadata-wrapped JSON form.
    pub async fn fetch(&self, repo_url: &str) -> Result<String, AppError> {
        let repo = parse_repo_url(repo_url)?;
        let api_url = format!("{}/repos/{}/{}/readme", self.base_url, repo.owner, repo.repo);

        let mut req = self
            .client
            .get(&api_url)
            .header(header::ACCEPT, "application/vnd.github.v3.raw");
        if let Some(token) = &self.token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let resp = req.send().await.map_err(|e| {
            tracing::warn!(url = %api_url, error = %e, "README fetch failed");
            AppError::UpstreamUnavailable(e.to_string())
        })?;

        match resp.status() {
            StatusCode::NOT_FOUND => Err(AppError::ReadmeNotFound),
            status if !status.is_success() => Err(AppError::UpstreamUnavailable(format!(
                "GitHub returned HTTP {}",
                status
            ))),
            _ => resp
                .text()
                .await
                .map_err(|e| AppError::UpstreamUnavailable(e.to_string())),
        }
    }
}
