//! IG-007: Google Gemini `generateContent` client.

use super::{Model, ModelError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini API client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GeminiClient {
    /// Create a client. Fails when the API key is empty.
    pub fn new(api_key: &str, model: &str, base_url: &str) -> Result<Self, ModelError> {
        if api_key.is_empty() {
            return Err(ModelError::AuthRequired("GEMINI_API_KEY".to_string()));
        }
        let client = Client::builder()
            .build()
            .map_err(|e| ModelError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl Model for GeminiClient {
    async fn generate(&self, instruction: &str) -> Result<String, ModelError> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: instruction }],
            }],
        };

        let url = self.endpoint();
        debug!(url = %url, "sending request to Gemini");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(ModelError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&text).map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::InvalidResponse("no candidates in response".to_string()))?;

        if candidate.content.parts.is_empty() {
            return Err(ModelError::InvalidResponse("no parts in candidate".to_string()));
        }

        Ok(candidate
            .content
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .concat())
    }

    fn name(&self) -> &str {
        &self.model
    }
}
