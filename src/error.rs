//! IG-015: Top-level error for a pipeline run.

use crate::cli::prompt::PromptError;
use crate::config::ConfigError;
use crate::core::catalog::CatalogError;
use crate::core::renderer::RenderError;
use crate::core::state::SnapshotError;
use crate::core::types::Stage;
use crate::core::validator::ValidationError;
use crate::llm::{GenerateError, ModelError};
use crate::provision::ProvisionError;
use std::path::PathBuf;
use thiserror::Error;

/// Any failure that aborts a command.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid resource type '{kind}' (expected one of: {available})")]
    InvalidKind { kind: String, available: String },

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("could not retrieve valid variables from the model: {0}")]
    Generate(#[from] GenerateError),

    #[error("parameter validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("cannot hash artifact {}: {source}", path.display())]
    Artifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Provision(#[from] ProvisionError),
}

impl PipelineError {
    /// Process exit code: the provisioning tool's own code when it failed,
    /// 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Provision(e) => e.exit_code(),
            _ => 1,
        }
    }

    /// Stage the error aborted.
    pub fn stage(&self) -> Stage {
        match self {
            Self::InvalidKind { .. } | Self::Catalog(_) => Stage::Kind,
            Self::Prompt(_) => Stage::Intent,
            Self::Config(_) | Self::Model(_) | Self::Generate(_) => Stage::Generate,
            Self::Validation(_) => Stage::Validate,
            Self::Snapshot(_) | Self::Render(_) | Self::Artifact { .. } => Stage::Render,
            Self::Provision(_) => Stage::Publish,
        }
    }
}
