//! The output contract enforced on model replies.

use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::AppError;

/// Structured summary extracted from a README. Extra top-level fields in
/// the model reply are tolerated and dropped during deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoSummary {
    pub summary: String,
    pub cool_facts: Vec<String>,
}

/// The JSON Schema a model reply must satisfy. Single source of truth for
/// what "valid output" means; also serialized verbatim into the prompt as
/// the format instructions.
pub static SUMMARY_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "summary": {
                "type": "string",
                "description": "A concise summary of the README content"
            },
            "cool_facts": {
                "type": "array",
                "items": { "type": "string" },
                "description": "A list of interesting facts about the repository"
            }
        },
        "required": ["summary", "cool_facts"]
    })
});

pub static FORMAT_INSTRUCTIONS: Lazy<String> = Lazy::new(|| {
    serde_json::to_string_pretty(&*SUMMARY_SCHEMA).expect("summary schema serializes")
});

static COMPILED: Lazy<JSONSchema> =
    Lazy::new(|| JSONSchema::compile(&SUMMARY_SCHEMA).expect("summary schema compiles"));

/// Parse a raw model reply into a validated [`RepoSummary`].
///
/// Code-fence wrappers are stripped first; anything that is not JSON, or
/// is JSON that fails the schema (missing field, non-list `cool_facts`,
/// non-string elements), becomes `SchemaViolation`. A parse failure is
/// never allowed to escape as a panic or partial data.
pub fn parse_summary(raw: &str) -> Result<RepoSummary, AppError> {
    let cleaned = strip_code_fences(raw);
    let value: Value = serde_json::from_str(cleaned)
        .map_err(|e| AppError::SchemaViolation(format!("reply is not valid JSON: {}", e)))?;

    if let Err(errors) = COMPILED.validate(&value) {
        let detail = errors
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(AppError::SchemaViolation(detail));
    }

    serde_json::from_value(value).map_err(|e| AppError::SchemaViolation(e.to_string()))
}

/// Models routinely wrap JSON in ```json fences despite instructions.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    match rest.rfind("```") {
        Some(end) => rest[..end].trim(),
        None => trimmed,
    }
}
