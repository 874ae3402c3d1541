//! End-to-end pipeline runs through the public API with in-process
//! stand-ins for the model, the object store and Terraform.

use async_trait::async_trait;
use chrono::{Local, TimeZone};
use infragen::core::catalog::Catalog;
use infragen::core::pipeline::{self, PipelineConfig};
use infragen::core::types::{RunEvent, UploadOutcome};
use infragen::core::validator;
use infragen::error::PipelineError;
use infragen::llm::{Model, ModelError};
use infragen::provenance::eventlog;
use infragen::provision::{ProvisionError, Provisioner, Step};
use infragen::storage::{UploadError, Uploader};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

struct CannedModel(&'static str);

#[async_trait]
impl Model for CannedModel {
    async fn generate(&self, _instruction: &str) -> Result<String, ModelError> {
        Ok(self.0.to_string())
    }

    fn name(&self) -> &str {
        "canned"
    }
}

struct RejectingStore;

#[async_trait]
impl Uploader for RejectingStore {
    async fn upload(&self, _path: &Path, _bucket: &str, _key: &str) -> Result<(), UploadError> {
        Err(UploadError::Credentials(
            "The AWS Access Key Id you provided does not exist".to_string(),
        ))
    }
}

#[derive(Default)]
struct RecordingTerraform {
    steps: Mutex<Vec<(Step, PathBuf)>>,
}

impl Provisioner for RecordingTerraform {
    fn run_step(&self, step: Step, dir: &Path) -> Result<(), ProvisionError> {
        self.steps.lock().unwrap().push((step, dir.to_path_buf()));
        Ok(())
    }
}

fn tf_files(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .map(|e| e.unwrap().path())
                .filter(|p| p.extension().is_some_and(|x| x == "tf"))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn s3_run_with_rejected_upload_still_applies() {
    let work = tempfile::tempdir().unwrap();
    let output_dir = work.path().join("terraform");
    let snapshot = work.path().join("variables.json");
    let templates = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates");
    let catalog = Catalog::builtin();

    let cfg = PipelineConfig {
        catalog: &catalog,
        kind: "s3",
        prompt: "an s3 bucket called my-bucket in us-east-1",
        templates_dir: &templates,
        output_dir: &output_dir,
        snapshot_path: &snapshot,
        bucket: Some("artifact-archive"),
        dry_run: false,
        skip_upload: false,
    };
    let model = CannedModel("```json\n{\"region\":\"us-east-1\",\"name\":\"my-bucket\"}\n```");
    let terraform = RecordingTerraform::default();

    let summary = pipeline::run(&cfg, &model, &RejectingStore, &terraform)
        .await
        .unwrap();

    let rendered = std::fs::read_to_string(&summary.artifact.path).unwrap();
    assert!(rendered.contains("region = \"us-east-1\""));
    assert!(rendered.contains("bucket = \"my-bucket\""));
    assert!(matches!(summary.upload, Some(UploadOutcome::Failed { .. })));

    let steps = terraform.steps.lock().unwrap();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0], (Step::Init, output_dir.clone()));
    assert_eq!(steps[1], (Step::Apply, output_dir.clone()));

    let events = eventlog::read_events(&output_dir).unwrap();
    assert!(events.iter().any(|e| matches!(
        &e.event,
        RunEvent::UploadFinished { outcome: UploadOutcome::Failed { .. }, .. }
    )));
}

#[tokio::test]
async fn ec2_run_with_missing_keys_writes_nothing() {
    let work = tempfile::tempdir().unwrap();
    let output_dir = work.path().join("terraform");
    let snapshot = work.path().join("variables.json");
    let templates = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates");
    let catalog = Catalog::builtin();

    let cfg = PipelineConfig {
        catalog: &catalog,
        kind: "ec2",
        prompt: "a t3.micro ec2 instance",
        templates_dir: &templates,
        output_dir: &output_dir,
        snapshot_path: &snapshot,
        bucket: Some("artifact-archive"),
        dry_run: false,
        skip_upload: false,
    };
    let model = CannedModel(r#"{"region":"us-east-1","name":"x"}"#);
    let terraform = RecordingTerraform::default();

    let err = pipeline::run(&cfg, &model, &RejectingStore, &terraform)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Validation(_)));
    assert_eq!(err.exit_code(), 1);
    assert!(tf_files(&output_dir).is_empty());
    assert!(!snapshot.exists());
    assert!(terraform.steps.lock().unwrap().is_empty());
}

/// Every artifact is a complete root module. Terraform reads all `.tf` files
/// in the directory it runs in, so a second artifact in the same output
/// directory repeats the `provider "aws"` block and the `this` resource.
/// `terraform init` rejects that pair until the earlier file is moved away.
#[test]
fn second_artifact_in_output_dir_repeats_provider_block() {
    let work = tempfile::tempdir().unwrap();
    let output_dir = work.path().join("terraform");
    let templates = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates");
    let catalog = Catalog::builtin();
    let kind = catalog.get("s3").unwrap();

    let mut artifacts = Vec::new();
    for (minute, name) in [(0, "logs.example.com"), (1, "web assets")] {
        let raw = serde_json::from_str(&format!(r#"{{"region":"us-east-1","name":"{name}"}}"#))
            .unwrap();
        let params = validator::coerce(&raw, kind).unwrap();
        let at = Local.with_ymd_and_hms(2024, 6, 1, 12, minute, 0).single().unwrap();
        artifacts.push(pipeline::render_artifact(kind, &params, &templates, &output_dir, &at).unwrap());
    }

    assert_eq!(tf_files(&output_dir).len(), 2);
    for artifact in &artifacts {
        let text = std::fs::read_to_string(&artifact.path).unwrap();
        assert_eq!(text.matches("provider \"aws\" {").count(), 1);
        assert!(text.contains("resource \"aws_s3_bucket\" \"this\" {"));
        assert_eq!(pipeline::artifact_dir(&artifact.path), output_dir);
    }
    assert_eq!(
        pipeline::sibling_artifacts(&artifacts[1].path),
        vec![artifacts[0].path.clone()]
    );
}
