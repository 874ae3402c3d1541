//! IG-009: Pipeline orchestrator.
//!
//! kind → intent → generate → validate → render → publish
//!
//! Any stage error aborts the run and is recorded in the run log. The upload
//! is the one exception: it is best-effort and never aborts provisioning.

use super::catalog::Catalog;
use super::renderer;
use super::state;
use super::types::{Artifact, ParameterSet, ResourceKind, RunEvent, UploadOutcome};
use super::validator;
use crate::error::PipelineError;
use crate::llm::{self, Model};
use crate::provenance::{eventlog, hasher};
use crate::provision::{Provisioner, Step};
use crate::storage::{self, Uploader};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Inputs for one pipeline run.
pub struct PipelineConfig<'a> {
    pub catalog: &'a Catalog,
    /// Resource kind as entered (trimmed and lowercased before lookup)
    pub kind: &'a str,
    /// Free-text intent
    pub prompt: &'a str,
    pub templates_dir: &'a Path,
    pub output_dir: &'a Path,
    pub snapshot_path: &'a Path,
    /// Archive bucket; `None` skips the upload
    pub bucket: Option<&'a str>,
    /// Stop after rendering
    pub dry_run: bool,
    pub skip_upload: bool,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: String,
    pub parameters: ParameterSet,
    pub artifact: Artifact,
    /// `None` when the upload was not attempted (dry run or skipped)
    pub upload: Option<UploadOutcome>,
    pub provisioned: bool,
}

/// Look up a kind by user input, ignoring case and surrounding whitespace.
pub fn select_kind<'c>(catalog: &'c Catalog, input: &str) -> Result<&'c ResourceKind, PipelineError> {
    let name = input.trim().to_lowercase();
    catalog.get(&name).ok_or_else(|| PipelineError::InvalidKind {
        kind: name,
        available: catalog.names().join(", "),
    })
}

/// Render `kind` into a timestamped artifact under `output_dir` and hash it.
pub fn render_artifact(
    kind: &ResourceKind,
    params: &ParameterSet,
    templates_dir: &Path,
    output_dir: &Path,
    at: &DateTime<Local>,
) -> Result<Artifact, PipelineError> {
    let output = state::artifact_path(output_dir, &kind.name, at);
    let path = renderer::render_template(templates_dir, &kind.template, params, &output)?;
    let hash = hasher::hash_file(&path).map_err(|source| PipelineError::Artifact {
        path: path.clone(),
        source,
    })?;
    Ok(Artifact {
        kind: kind.name.clone(),
        path,
        hash,
    })
}

/// Directory the provisioning tool runs in.
pub fn artifact_dir(artifact: &Path) -> PathBuf {
    match artifact.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Other `.tf` files next to an artifact, sorted.
pub fn sibling_artifacts(artifact: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(artifact_dir(artifact)) else {
        return Vec::new();
    };
    let own = artifact.file_name();
    let mut found: Vec<PathBuf> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|x| x == "tf") && p.file_name() != own)
        .collect();
    found.sort();
    found
}

fn record(output_dir: &Path, event: RunEvent) {
    if let Err(e) = eventlog::append_event(output_dir, event) {
        warn!("cannot write run log in {}: {}", output_dir.display(), e);
    }
}

/// Execute the full pipeline.
pub async fn run(
    cfg: &PipelineConfig<'_>,
    model: &dyn Model,
    uploader: &dyn Uploader,
    provisioner: &dyn Provisioner,
) -> Result<RunSummary, PipelineError> {
    let run_id = eventlog::generate_run_id();
    record(
        cfg.output_dir,
        RunEvent::RunStarted {
            run_id: run_id.clone(),
            kind: cfg.kind.trim().to_lowercase(),
            infragen_version: env!("CARGO_PKG_VERSION").to_string(),
        },
    );

    let result = run_stages(cfg, &run_id, model, uploader, provisioner).await;
    if let Err(e) = &result {
        record(
            cfg.output_dir,
            RunEvent::RunFailed {
                run_id,
                stage: e.stage(),
                error: e.to_string(),
            },
        );
    }
    result
}

async fn run_stages(
    cfg: &PipelineConfig<'_>,
    run_id: &str,
    model: &dyn Model,
    uploader: &dyn Uploader,
    provisioner: &dyn Provisioner,
) -> Result<RunSummary, PipelineError> {
    let kind = select_kind(cfg.catalog, cfg.kind)?;
    info!(run_id, kind = %kind.name, "starting run");

    if let Some(inferred) = cfg.catalog.infer_kind(cfg.prompt) {
        if inferred.name != kind.name {
            warn!(
                selected = %kind.name,
                mentioned = %inferred.name,
                "prompt mentions a different resource type; using the selected one"
            );
        }
    }

    // Generate
    let raw = llm::generate_parameters(model, cfg.prompt, kind).await?;
    println!(
        "Variables from model:\n{}",
        serde_json::to_string_pretty(&raw).unwrap_or_default()
    );
    record(
        cfg.output_dir,
        RunEvent::ParametersGenerated {
            run_id: run_id.to_string(),
            keys: raw.keys().cloned().collect(),
        },
    );

    // Validate
    let parameters = validator::coerce(&raw, kind)?;

    // Render
    state::save_snapshot(cfg.snapshot_path, &raw)?;
    let artifact = render_artifact(
        kind,
        &parameters,
        cfg.templates_dir,
        cfg.output_dir,
        &Local::now(),
    )?;
    println!("Terraform code generated at: {}", artifact.path.display());
    record(
        cfg.output_dir,
        RunEvent::ArtifactRendered {
            run_id: run_id.to_string(),
            path: artifact.path.display().to_string(),
            hash: artifact.hash.clone(),
        },
    );

    if cfg.dry_run {
        println!("Dry run: skipping upload and provisioning.");
        return Ok(RunSummary {
            run_id: run_id.to_string(),
            parameters,
            artifact,
            upload: None,
            provisioned: false,
        });
    }

    // Publish
    let upload = if cfg.skip_upload {
        info!("upload skipped by request");
        None
    } else {
        let outcome = storage::upload_best_effort(uploader, &artifact.path, cfg.bucket, None).await;
        println!("Upload: {}", outcome);
        record(
            cfg.output_dir,
            RunEvent::UploadFinished {
                run_id: run_id.to_string(),
                outcome: outcome.clone(),
            },
        );
        Some(outcome)
    };

    let dir = artifact_dir(&artifact.path);
    let siblings = sibling_artifacts(&artifact.path);
    if !siblings.is_empty() {
        warn!(
            dir = %dir.display(),
            count = siblings.len(),
            "terraform loads every .tf file in the directory; earlier artifacts repeat the provider and resource blocks"
        );
    }
    let finished = |step: Step| {
        record(
            cfg.output_dir,
            RunEvent::ProvisionFinished {
                run_id: run_id.to_string(),
                step: step.to_string(),
            },
        )
    };

    println!("Running terraform {} in {}...", Step::Init, dir.display());
    provisioner.init(&dir)?;
    finished(Step::Init);

    println!("Running terraform {} in {}...", Step::Apply, dir.display());
    provisioner.apply(&dir)?;
    finished(Step::Apply);

    Ok(RunSummary {
        run_id: run_id.to_string(),
        parameters,
        artifact,
        upload,
        provisioned: true,
    })
}

/// Re-render a kind from a saved parameter snapshot without calling the
/// model or the provisioning tool.
pub fn render_from_snapshot(
    catalog: &Catalog,
    kind: &str,
    snapshot_path: &Path,
    templates_dir: &Path,
    output_dir: &Path,
) -> Result<Artifact, PipelineError> {
    let kind = select_kind(catalog, kind)?;
    let raw = state::load_snapshot(snapshot_path)?;
    let parameters = validator::coerce(&raw, kind)?;
    let artifact = render_artifact(kind, &parameters, templates_dir, output_dir, &Local::now())?;
    record(
        output_dir,
        RunEvent::ArtifactRendered {
            run_id: eventlog::generate_run_id(),
            path: artifact.path.display().to_string(),
            hash: artifact.hash.clone(),
        },
    );
    Ok(artifact)
}
