//! IG-011: Run a program in an explicit working directory.
//!
//! The child inherits stdio so the tool's own progress output reaches the
//! user. The caller's working directory is never changed.

use super::{ExecOutput, TransportError};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Run `program args...` with `dir` as its working directory and wait.
pub fn run_in_dir(program: &str, args: &[&str], dir: &Path) -> Result<ExecOutput, TransportError> {
    if !dir.is_dir() {
        return Err(TransportError::MissingDir(dir.to_path_buf()));
    }

    debug!(program, ?args, dir = %dir.display(), "spawning");
    let status = Command::new(program)
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|source| TransportError::Spawn {
            program: program.to_string(),
            source,
        })?;

    Ok(ExecOutput {
        exit_code: status.code().unwrap_or(-1),
    })
}
