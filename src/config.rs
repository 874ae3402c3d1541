//! IG-013: Process configuration from the environment.
//!
//! `main` loads a `.env` file (if any) before this runs, so values set there
//! and in the real environment look the same here.

use crate::llm::gemini::DEFAULT_BASE_URL;
use crate::provision::DEFAULT_TERRAFORM_BIN;
use thiserror::Error;

/// Default Gemini model.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),
}

/// Settings resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub s3_bucket: Option<String>,
    pub aws_region: Option<String>,
    pub terraform_bin: String,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_base_url: get("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            s3_bucket: get("S3_BUCKET_NAME"),
            aws_region: get("AWS_REGION"),
            terraform_bin: get("TERRAFORM_BIN")
                .unwrap_or_else(|| DEFAULT_TERRAFORM_BIN.to_string()),
        }
    }

    /// The Gemini API key, required for parameter generation.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.gemini_api_key
            .as_deref()
            .ok_or(ConfigError::Missing("GEMINI_API_KEY"))
    }
}
