//! gitdigest — API-key gated GitHub README summarization service.
//!
//! The core pipeline: validate an `x-api-key` against the key store, fetch
//! the repository README from GitHub, and extract a schema-validated
//! structured summary from a language model.

use std::sync::Arc;

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod github;
pub mod keys;
pub mod store;
pub mod summarizer;

/// Shared application state passed to handlers and middleware.
///
/// Every external collaborator is an explicitly constructed, injected
/// client; the key store and model sit behind traits so tests can swap
/// in fakes.
pub struct AppState {
    pub db: Arc<dyn store::KeyStore>,
    pub readme: github::ReadmeFetcher,
    pub model: Arc<dyn summarizer::SummaryModel>,
    pub config: config::Config,
}
