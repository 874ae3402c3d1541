//! IG-011: Local process transport for external tools.

pub mod local;

use std::path::PathBuf;
use thiserror::Error;

/// Exit status of an external command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOutput {
    /// Exit code, or -1 when the process was killed by a signal
    pub exit_code: i32,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Failure to start or wait on an external command.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("working directory {} does not exist", .0.display())]
    MissingDir(PathBuf),
}
