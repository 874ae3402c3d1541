//! IG-006: Parameter generation from a hosted language model.
//!
//! The generator builds an instruction naming the kind's required keys,
//! submits it through a [`Model`], strips a markdown code fence if the model
//! added one anyway, and parses the remainder as a JSON object.

pub mod gemini;

use crate::core::types::{RawParameters, ResourceKind};
use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Errors from the model transport.
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    /// No API key configured.
    #[error("authentication required: {0} is not set")]
    AuthRequired(String),

    /// The HTTP request failed before a response arrived.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Errors from parameter generation.
#[derive(Debug, Clone, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("model returned invalid JSON: {reason}")]
    Malformed { reason: String, raw: String },

    #[error("model returned JSON that is not an object")]
    NotAnObject,

    #[error("model returned an empty parameter set")]
    Empty,
}

/// A hosted text-generation model.
#[async_trait]
pub trait Model: Send + Sync {
    /// Submit an instruction and return the response text.
    async fn generate(&self, instruction: &str) -> Result<String, ModelError>;

    /// Model identifier, for logs.
    fn name(&self) -> &str;
}

/// Build the instruction sent to the model.
pub fn build_instruction(prompt: &str, kind: &ResourceKind) -> String {
    let keys = kind
        .required_keys()
        .iter()
        .map(|k| format!("'{}'", k))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "You are a Terraform assistant. Return only a VALID JSON object (no markdown) \
         with the following keys: [{}]. \
         Do NOT include explanations or code blocks. Prompt: {}",
        keys, prompt
    )
}

/// Trim the response and drop a surrounding markdown code fence.
///
/// When the trimmed text starts with three backticks, the first and last
/// lines are removed and the remainder trimmed again.
pub fn strip_code_fence(response: &str) -> String {
    let content = response.trim();
    if !content.starts_with("```") {
        return content.to_string();
    }
    let lines: Vec<&str> = content.lines().collect();
    if lines.len() < 2 {
        return String::new();
    }
    lines[1..lines.len() - 1].join("\n").trim().to_string()
}

/// Parse a model response into raw parameters.
pub fn parse_parameters(response: &str) -> Result<RawParameters, GenerateError> {
    let content = strip_code_fence(response);
    let value: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| GenerateError::Malformed {
            reason: e.to_string(),
            raw: content.clone(),
        })?;
    match value {
        serde_json::Value::Object(map) if map.is_empty() => Err(GenerateError::Empty),
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(GenerateError::NotAnObject),
    }
}

/// Ask the model for the parameters of `kind` described by `prompt`.
pub async fn generate_parameters(
    model: &dyn Model,
    prompt: &str,
    kind: &ResourceKind,
) -> Result<RawParameters, GenerateError> {
    let instruction = build_instruction(prompt, kind);
    debug!(model = model.name(), kind = %kind.name, "submitting instruction");

    let response = model.generate(&instruction).await.map_err(|e| {
        error!(model = model.name(), "model request failed: {}", e);
        GenerateError::from(e)
    })?;

    parse_parameters(&response).map_err(|e| {
        if let GenerateError::Malformed { raw, .. } = &e {
            warn!("invalid JSON received from model; raw content:\n{}", raw);
        }
        e
    })
}
