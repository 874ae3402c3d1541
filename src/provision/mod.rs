//! IG-012: Provisioning through the Terraform CLI.
//!
//! `init` then `apply -auto-approve`, each a blocking subprocess run with the
//! artifact's directory as its working directory.

use crate::transport::{self, TransportError};
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Default Terraform executable.
pub const DEFAULT_TERRAFORM_BIN: &str = "terraform";

/// Provisioning step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Init,
    Apply,
}

impl Step {
    /// Subcommand arguments for the step.
    pub fn args(self) -> &'static [&'static str] {
        match self {
            Self::Init => &["init"],
            Self::Apply => &["apply", "-auto-approve"],
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::Apply => write!(f, "apply"),
        }
    }
}

/// Provisioning failures.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("{program} {step} exited with {code}")]
    Failed {
        program: String,
        step: Step,
        code: i32,
    },
}

impl ProvisionError {
    /// Exit code to propagate to the shell.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Failed { code, .. } if *code > 0 => *code,
            _ => 1,
        }
    }
}

/// An external tool that applies rendered artifacts.
pub trait Provisioner {
    /// Run one step in `dir`.
    fn run_step(&self, step: Step, dir: &Path) -> Result<(), ProvisionError>;

    fn init(&self, dir: &Path) -> Result<(), ProvisionError> {
        self.run_step(Step::Init, dir)
    }

    fn apply(&self, dir: &Path) -> Result<(), ProvisionError> {
        self.run_step(Step::Apply, dir)
    }
}

/// The Terraform command-line tool.
#[derive(Debug, Clone)]
pub struct TerraformCli {
    pub binary: String,
}

impl TerraformCli {
    pub fn new(binary: &str) -> Self {
        Self {
            binary: binary.to_string(),
        }
    }
}

impl Default for TerraformCli {
    fn default() -> Self {
        Self::new(DEFAULT_TERRAFORM_BIN)
    }
}

impl Provisioner for TerraformCli {
    fn run_step(&self, step: Step, dir: &Path) -> Result<(), ProvisionError> {
        info!(step = %step, dir = %dir.display(), "running {} {}", self.binary, step);
        let out = transport::local::run_in_dir(&self.binary, step.args(), dir)?;
        if out.success() {
            Ok(())
        } else {
            Err(ProvisionError::Failed {
                program: self.binary.clone(),
                step,
                code: out.exit_code,
            })
        }
    }
}
