//! Structured README summarization against a language-model backend.

use async_trait::async_trait;

use crate::errors::AppError;

pub mod openai;
pub mod schema;

pub use schema::RepoSummary;

/// Capability seam for the model backend: README text in, schema-validated
/// summary out. Production uses [`openai::OpenAiModel`]; tests use fakes.
#[async_trait]
pub trait SummaryModel: Send + Sync {
    async fn summarize(&self, readme: &str) -> Result<RepoSummary, AppError>;
}

/// Build the single-shot extraction prompt: the README verbatim plus
/// format instructions derived from the output schema.
pub fn build_prompt(readme: &str) -> String {
    format!(
        "Summarize the content of the following README.\n\n\
         {readme}\n\n\
         You must answer with a single JSON object conforming to this JSON Schema:\n\
         {schema}\n\n\
         Return only the raw JSON object, with no markdown formatting, code fences, or commentary.",
        readme = readme,
        schema = &*schema::FORMAT_INSTRUCTIONS,
    )
}
