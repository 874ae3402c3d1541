//! IG-004: Template rendering.
//!
//! Resolves `{{ key }}` placeholders from a validated `ParameterSet` and
//! writes the result. Substituted text is never re-scanned, so values that
//! happen to contain `{{` are emitted verbatim.

use super::types::ParameterSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Rendering failures.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template not found: {name} (in {})", dir.display())]
    TemplateNotFound { name: String, dir: PathBuf },

    #[error("template references unknown parameter: {0}")]
    UnknownPlaceholder(String),

    #[error("unclosed template placeholder at position {position}")]
    Unclosed { position: usize },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Resolve all placeholders in a template string.
pub fn resolve_template(template: &str, params: &ParameterSet) -> Result<String, RenderError> {
    let mut result = String::with_capacity(template.len());
    let mut start = 0;

    while let Some(open) = template[start..].find("{{") {
        let open = start + open;
        let close = template[open..]
            .find("}}")
            .ok_or(RenderError::Unclosed { position: open })?;
        let close = open + close + 2;
        let key = template[open + 2..close - 2].trim();

        let value = params
            .get(key)
            .ok_or_else(|| RenderError::UnknownPlaceholder(key.to_string()))?;

        result.push_str(&template[start..open]);
        result.push_str(value);
        start = close;
    }

    result.push_str(&template[start..]);
    Ok(result)
}

/// Placeholder keys referenced by a template, in first-use order.
pub fn placeholders(template: &str) -> Result<Vec<String>, RenderError> {
    let mut keys: Vec<String> = Vec::new();
    let mut start = 0;

    while let Some(open) = template[start..].find("{{") {
        let open = start + open;
        let close = template[open..]
            .find("}}")
            .ok_or(RenderError::Unclosed { position: open })?;
        let key = template[open + 2..open + close].trim().to_string();
        if !keys.contains(&key) {
            keys.push(key);
        }
        start = open + close + 2;
    }

    Ok(keys)
}

/// Path of a template reference inside the template directory.
/// Only the reference's base name is used.
pub fn template_path(templates_dir: &Path, reference: &str) -> PathBuf {
    let name = Path::new(reference)
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| reference.into());
    templates_dir.join(name)
}

/// Render a template reference with `params` and write it to `output`,
/// creating parent directories. An existing file is overwritten.
pub fn render_template(
    templates_dir: &Path,
    reference: &str,
    params: &ParameterSet,
    output: &Path,
) -> Result<PathBuf, RenderError> {
    let path = template_path(templates_dir, reference);
    if !path.is_file() {
        return Err(RenderError::TemplateNotFound {
            name: reference.to_string(),
            dir: templates_dir.to_path_buf(),
        });
    }

    let template = std::fs::read_to_string(&path).map_err(|source| RenderError::Io {
        path: path.clone(),
        source,
    })?;
    let rendered = resolve_template(&template, params)?;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| RenderError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    std::fs::write(output, rendered).map_err(|source| RenderError::Io {
        path: output.to_path_buf(),
        source,
    })?;

    debug!(template = %path.display(), output = %output.display(), "rendered template");
    Ok(output.to_path_buf())
}
