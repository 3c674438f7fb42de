//! Site database migration CLI
//!
//! Pulls the database of one wp-cli environment into another and rewrites
//! stored URLs for the destination host.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cmd;
mod config;
mod context;
mod progress;
mod utils;

use context::AppContext;

#[derive(Parser)]
#[command(name = "site-migrate")]
#[command(about = "Site database migration tool")]
#[command(version)]
struct Cli {
    /// Run in quiet mode (non-interactive, no progress output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log wp-cli command lines
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Site root the wp-cli commands run in (defaults to the current directory)
    #[arg(short = 'C', long, global = true)]
    workdir: Option<PathBuf>,

    /// Config file (defaults to migrations.config.toml in the site root)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace the destination database with the origin's
    Run {
        #[command(flatten)]
        envs: cmd::EnvPair,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show the steps a run would execute
    Plan {
        #[command(flatten)]
        envs: cmd::EnvPair,
    },

    /// Write a starter migrations.config.toml
    GenerateConfig {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "info,site_migrate=debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() -> ExitCode {
    // Load environment variables
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run(cli: Cli) -> Result<()> {
    let ctx = AppContext::new(cli.workdir, cli.quiet)?;
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Run { envs, yes } => cmd::run::run(&ctx, config, &envs, yes),
        Commands::Plan { envs } => cmd::plan::run(&ctx, config, &envs),
        Commands::GenerateConfig { force } => cmd::generate::run(&ctx, config, force),
    }
}
