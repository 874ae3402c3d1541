//! infragen CLI: describe a resource, get Terraform applied.

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "infragen",
    version,
    about = "Natural-language to Terraform: generate, validate, render, archive and apply"
)]
struct Cli {
    #[command(subcommand)]
    command: infragen::cli::Commands,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("infragen=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = infragen::cli::dispatch(cli.command).await {
        eprintln!("error: {}", e);
        std::process::exit(e.exit_code());
    }
}
