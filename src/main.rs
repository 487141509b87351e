use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use forgetag::{config, TagCreator, TagRequest};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "forgetag", version, about = "Create an annotated release tag on a forge")]
struct Cli {
    /// Repository in `owner/name` form.
    #[arg(long)]
    repo: String,

    /// Branch name or commit SHA to tag.
    #[arg(long)]
    revision: String,

    /// Name of the tag to create (e.g. `v1.0.0`).
    #[arg(long)]
    tag: String,

    /// Optional YAML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the forge API root URL.
    #[arg(long)]
    api_url: Option<String>,

    /// Override the per-request timeout in seconds.
    #[arg(long)]
    timeout: Option<u64>,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

fn build_config(cli: &Cli) -> Result<config::Config> {
    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => config::Config::default(),
    };
    if let Some(api_url) = &cli.api_url {
        config.api.api_url = api_url.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.api.request_timeout_secs = timeout;
    }
    config::validate_config(&config)?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let config = build_config(&cli)?;
    tracing::debug!(api_url = %config.api.api_url, "configuration loaded");

    let creator = TagCreator::from_config(&config).context("failed to set up forge client")?;

    let request = TagRequest::new(&cli.repo, &cli.revision, &cli.tag);
    let url = creator
        .create_tag_request(&request)
        .await
        .with_context(|| format!("failed to create tag {} in {}", cli.tag, cli.repo))?;

    println!("{url}");
    Ok(())
}
