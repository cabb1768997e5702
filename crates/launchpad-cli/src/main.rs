use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

use commands::context::AppContext;

#[derive(Parser)]
#[command(name = "launchpad")]
#[command(about = "Launchpad - resumable report generation for startup ideas", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to ~/.config/launchpad/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the persisted generation state
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate (or resume generating) every report for a startup idea
    Generate(commands::generate::GenerateArgs),
    /// Show progress of the current session
    Status {
        /// Print progress as JSON
        #[arg(long)]
        json: bool,
    },
    /// Discard the in-progress session
    Reset {
        /// Also delete the last completed reports
        #[arg(long)]
        all: bool,
    },
    /// Print or export the last completed reports
    Reports(commands::reports::ReportsArgs),
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LAUNCHPAD_LOG").unwrap_or_else(|_| "launchpad=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let ctx = AppContext::load(cli.config, cli.state_dir)?;

    match cli.command {
        Commands::Generate(args) => commands::generate::run(&ctx, args).await?,
        Commands::Status { json } => commands::status::run(&ctx, json).await?,
        Commands::Reset { all } => commands::reset::run(&ctx, all).await?,
        Commands::Reports(args) => commands::reports::run(&ctx, args).await?,
    }

    Ok(())
}
