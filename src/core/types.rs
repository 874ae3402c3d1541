//! IG-001: Core types for resource kinds, parameters, artifacts and run events.
//!
//! Resource kinds are statically configured (built-in or YAML catalog) and
//! immutable at run time. Parameters flow from the model as `RawParameters`
//! and only become a `ParameterSet` after passing the validator.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

// ============================================================================
// Resource kinds
// ============================================================================

/// Expected primitive type of a required parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    #[default]
    String,
    Integer,
    Number,
    Boolean,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Integer => write!(f, "integer"),
            Self::Number => write!(f, "number"),
            Self::Boolean => write!(f, "boolean"),
        }
    }
}

/// A required parameter of a resource kind.
///
/// Catalog files may write either a bare key (`region`) or a mapping
/// (`{ name: port, type: integer }`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ParamSpecDef")]
pub struct ParamSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
}

impl ParamSpec {
    /// A string-typed parameter.
    pub fn string(name: &str) -> Self {
        Self {
            name: name.to_string(),
            param_type: ParamType::String,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ParamSpecDef {
    Bare(String),
    Full {
        name: String,
        #[serde(rename = "type", default)]
        param_type: ParamType,
    },
}

impl From<ParamSpecDef> for ParamSpec {
    fn from(def: ParamSpecDef) -> Self {
        match def {
            ParamSpecDef::Bare(name) => Self {
                name,
                param_type: ParamType::String,
            },
            ParamSpecDef::Full { name, param_type } => Self { name, param_type },
        }
    }
}

/// An infrastructure object type the tool can generate configuration for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceKind {
    /// Kind name (lowercase, e.g. `ec2`)
    pub name: String,

    /// Template reference inside the template directory
    pub template: String,

    /// Required parameters, in prompt order
    #[serde(default)]
    pub required: Vec<ParamSpec>,
}

impl ResourceKind {
    /// Required parameter names, in declaration order.
    pub fn required_keys(&self) -> Vec<&str> {
        self.required.iter().map(|p| p.name.as_str()).collect()
    }

    /// Look up the declared type of a parameter.
    pub fn param_type(&self, key: &str) -> Option<ParamType> {
        self.required
            .iter()
            .find(|p| p.name == key)
            .map(|p| p.param_type)
    }
}

// ============================================================================
// Parameters
// ============================================================================

/// Parameters exactly as the model returned them.
pub type RawParameters = serde_json::Map<String, serde_json::Value>;

/// A validated, string-valued parameter set ready for rendering.
///
/// Only the validator constructs these, so holding one means every required
/// key of its kind was present and non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParameterSet(IndexMap<String, String>);

impl ParameterSet {
    pub(crate) fn from_validated(values: IndexMap<String, String>) -> Self {
        Self(values)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// Artifacts
// ============================================================================

/// A rendered Terraform file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Resource kind it was rendered for
    pub kind: String,

    /// Path of the rendered file
    pub path: PathBuf,

    /// BLAKE3 hash of the file contents (`blake3:{hex}`)
    pub hash: String,
}

/// Result of the best-effort archive upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadOutcome {
    Uploaded { bucket: String, key: String },
    Skipped { reason: String },
    Failed { reason: String },
}

impl fmt::Display for UploadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uploaded { bucket, key } => write!(f, "uploaded to s3://{}/{}", bucket, key),
            Self::Skipped { reason } => write!(f, "skipped ({})", reason),
            Self::Failed { reason } => write!(f, "FAILED ({})", reason),
        }
    }
}

// ============================================================================
// Pipeline stages
// ============================================================================

/// Pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Kind,
    Intent,
    Generate,
    Validate,
    Render,
    Publish,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kind => write!(f, "kind"),
            Self::Intent => write!(f, "intent"),
            Self::Generate => write!(f, "generate"),
            Self::Validate => write!(f, "validate"),
            Self::Render => write!(f, "render"),
            Self::Publish => write!(f, "publish"),
        }
    }
}

// ============================================================================
// Run log events
// ============================================================================

/// Event recorded in the JSONL run log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    RunStarted {
        run_id: String,
        kind: String,
        infragen_version: String,
    },
    ParametersGenerated {
        run_id: String,
        keys: Vec<String>,
    },
    ArtifactRendered {
        run_id: String,
        path: String,
        hash: String,
    },
    UploadFinished {
        run_id: String,
        outcome: UploadOutcome,
    },
    ProvisionFinished {
        run_id: String,
        step: String,
    },
    RunFailed {
        run_id: String,
        stage: Stage,
        error: String,
    },
}

/// Timestamped event wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimestampedEvent {
    pub ts: String,
    #[serde(flatten)]
    pub event: RunEvent,
}

// ============================================================================
// Value helper
// ============================================================================

/// Convert a scalar JSON value to its template string form.
/// Returns `None` for arrays and objects.
pub fn json_scalar_to_string(val: &serde_json::Value) -> Option<String> {
    match val {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        serde_json::Value::Null => Some(String::new()),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
