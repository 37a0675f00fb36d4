//! patchbay CLI - inspect the node catalog and compute parameter snapshots.

mod commands;
mod patch;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "patchbay")]
#[command(author, version, about = "Modular synth patch engine CLI", long_about = None)]
struct Cli {
    /// Log debug events to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List node kinds, or show ports and controls of one kind
    Nodes(commands::nodes::NodesArgs),

    /// Build the factory patch, apply edits and print its snapshot as JSON
    Snapshot(commands::snapshot::SnapshotArgs),

    /// Print the effective session config, or write a default one
    Config(commands::config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let fallback = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Nodes(args) => commands::nodes::run(args),
        Commands::Snapshot(args) => commands::snapshot::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
