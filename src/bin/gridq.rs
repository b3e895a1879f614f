//! gridq CLI - Tabular Q-learning on grid worlds
//!
//! Trains an agent on a configurable grid world and prints the greedy
//! policy extracted from the learned value table.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gridq")]
#[command(version, about = "Tabular Q-learning on grid worlds", long_about = None)]
struct Cli {
    /// Log training progress (overridden by RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train an agent and print the extracted policy
    Train(Box<gridq::cli::commands::train::TrainArgs>),
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "gridq=debug" } else { "gridq=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Train(args) => gridq::cli::commands::train::execute(*args),
    }
}
