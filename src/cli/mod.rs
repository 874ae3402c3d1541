//! IG-016: CLI subcommands: run, render, kinds.

pub mod prompt;

use crate::config::Settings;
use crate::core::catalog::Catalog;
use crate::core::pipeline::{self, PipelineConfig, RunSummary};
use crate::core::state::SNAPSHOT_FILE;
use crate::error::PipelineError;
use crate::llm::gemini::GeminiClient;
use crate::provision::TerraformCli;
use crate::storage::s3::S3Uploader;
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

/// Paths shared by the rendering commands.
#[derive(Args, Debug, Clone)]
pub struct PathArgs {
    /// Template directory
    #[arg(long, default_value = "templates")]
    pub templates: PathBuf,

    /// Directory rendered artifacts are written to
    #[arg(long, default_value = "terraform")]
    pub output_dir: PathBuf,

    /// Resource catalog YAML (default: built-in kinds)
    #[arg(long)]
    pub catalog: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Describe a resource, render it, archive it and apply it
    Run {
        /// Resource type (asked interactively when omitted)
        #[arg(short, long)]
        kind: Option<String>,

        /// What to create (asked interactively when omitted)
        #[arg(short, long)]
        prompt: Option<String>,

        #[command(flatten)]
        paths: PathArgs,

        /// Parameter snapshot file
        #[arg(long, default_value = SNAPSHOT_FILE)]
        snapshot: PathBuf,

        /// Render only; no upload, no terraform
        #[arg(long)]
        dry_run: bool,

        /// Do not upload the artifact to S3
        #[arg(long)]
        skip_upload: bool,
    },

    /// Re-render a resource from a saved parameter snapshot
    Render {
        /// Resource type
        #[arg(short, long)]
        kind: String,

        /// Parameter snapshot to render from
        #[arg(long, default_value = SNAPSHOT_FILE)]
        vars: PathBuf,

        #[command(flatten)]
        paths: PathArgs,
    },

    /// List resource types with their templates and required parameters
    Kinds {
        /// Resource catalog YAML (default: built-in kinds)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

/// Dispatch a CLI command.
pub async fn dispatch(cmd: Commands) -> Result<(), PipelineError> {
    match cmd {
        Commands::Run {
            kind,
            prompt,
            paths,
            snapshot,
            dry_run,
            skip_upload,
        } => cmd_run(kind, prompt, &paths, &snapshot, dry_run, skip_upload).await,
        Commands::Render { kind, vars, paths } => cmd_render(&kind, &vars, &paths),
        Commands::Kinds { catalog } => cmd_kinds(catalog.as_deref()),
    }
}

async fn cmd_run(
    kind: Option<String>,
    intent: Option<String>,
    paths: &PathArgs,
    snapshot: &Path,
    dry_run: bool,
    skip_upload: bool,
) -> Result<(), PipelineError> {
    let settings = Settings::from_env();
    let api_key = settings.require_api_key()?;
    let catalog = Catalog::resolve(paths.catalog.as_deref())?;

    let kind = match kind {
        Some(k) => k,
        None => prompt::ask_stdin(&prompt::kind_prompt(&catalog.names()))?,
    };
    pipeline::select_kind(&catalog, &kind)?;

    let intent = match intent {
        Some(p) => p,
        None => prompt::ask_stdin(prompt::INTENT_PROMPT)?,
    };

    let model = GeminiClient::new(api_key, &settings.gemini_model, &settings.gemini_base_url)?;
    let uploader = S3Uploader::from_env(settings.aws_region.as_deref()).await;
    let provisioner = TerraformCli::new(&settings.terraform_bin);

    let cfg = PipelineConfig {
        catalog: &catalog,
        kind: &kind,
        prompt: &intent,
        templates_dir: &paths.templates,
        output_dir: &paths.output_dir,
        snapshot_path: snapshot,
        bucket: settings.s3_bucket.as_deref(),
        dry_run,
        skip_upload,
    };

    let summary = pipeline::run(&cfg, &model, &uploader, &provisioner).await?;
    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("Run {} complete:", summary.run_id);
    println!("  Artifact: {}", summary.artifact.path.display());
    println!("  Hash:     {}", summary.artifact.hash);
    if let Some(upload) = &summary.upload {
        println!("  Upload:   {}", upload);
    }
    println!(
        "  Applied:  {}",
        if summary.provisioned { "yes" } else { "no (dry run)" }
    );
}

fn cmd_render(kind: &str, vars: &Path, paths: &PathArgs) -> Result<(), PipelineError> {
    let catalog = Catalog::resolve(paths.catalog.as_deref())?;
    let artifact = pipeline::render_from_snapshot(
        &catalog,
        kind,
        vars,
        &paths.templates,
        &paths.output_dir,
    )?;
    println!("Terraform code generated at: {}", artifact.path.display());
    println!("  Hash: {}", artifact.hash);
    Ok(())
}

fn cmd_kinds(catalog: Option<&Path>) -> Result<(), PipelineError> {
    let catalog = Catalog::resolve(catalog)?;
    for kind in catalog.kinds() {
        let required = kind
            .required
            .iter()
            .map(|p| format!("{}:{}", p.name, p.param_type))
            .collect::<Vec<_>>()
            .join(", ");
        println!("{} ({})", kind.name, kind.template);
        println!("  required: {}", required);
    }
    Ok(())
}
