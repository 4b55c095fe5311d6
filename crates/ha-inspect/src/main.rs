//! Home Assistant entity inspector
//!
//! Runs entity analysis and dependency reports against an exported snapshot
//! and prints the tool output to stdout. Logs go to stderr.

mod config;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ha_introspection::tools::{analyze_entity, get_entity_dependencies};
use ha_introspection::{Introspector, RequestContext, SnapshotBackend, ToolOutput};
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::InspectConfig;

#[derive(Parser)]
#[command(name = "ha-inspect")]
#[command(about = "Find what references a Home Assistant entity and what automations depend on")]
#[command(version)]
struct Cli {
    /// YAML configuration file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Snapshot to analyze, overriding the configuration
    #[arg(long, short)]
    snapshot: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show an entity and everything that references it
    Analyze {
        entity_id: String,

        /// Include recent state history
        #[arg(long)]
        history: bool,
    },

    /// Show what an automation or script depends on
    Dependencies { entity_id: String },
}

fn init_tracing(default_level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<ToolOutput> {
    let mut config = InspectConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(snapshot) = cli.snapshot {
        config.snapshot = Some(snapshot);
    }
    config.validate()?;

    init_tracing(&config.log_level);

    let snapshot_path = config.snapshot_path()?;
    let backend = SnapshotBackend::load(snapshot_path)
        .with_context(|| format!("loading snapshot {}", snapshot_path.display()))?;
    info!(snapshot = %snapshot_path.display(), "Snapshot loaded");

    let introspector = Introspector::with_options(Arc::new(backend), config.analyzer_options());

    let (ctx, cancel) = RequestContext::new();
    let ctx = ctx.with_timeout(config.request_timeout());

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling request");
            cancel.cancel();
        }
    });

    let output = match cli.command {
        Command::Analyze { entity_id, history } => {
            let args = json!({"entity_id": entity_id, "include_history": history});
            analyze_entity(&introspector, &ctx, args).await
        }
        Command::Dependencies { entity_id } => {
            let args = json!({"entity_id": entity_id});
            get_entity_dependencies(&introspector, &ctx, args).await
        }
    };
    Ok(output)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let output = run(Cli::parse()).await?;

    if output.is_error {
        eprintln!("error: {}", output.text);
        return Ok(ExitCode::FAILURE);
    }

    println!("{}", output.text);
    Ok(ExitCode::SUCCESS)
}
