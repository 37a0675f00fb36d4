//! Config command: show the effective session config or write a default.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use patchbay_config::{SessionConfig, user_config_file};

use crate::commands::common::load_config;

#[derive(Args)]
pub struct ConfigArgs {
    /// Config file to show (default: ./patchbay.toml, then the user config)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the default config to FILE instead of printing
    #[arg(long, value_name = "FILE")]
    init: Option<PathBuf>,

    /// Overwrite FILE if it already exists
    #[arg(long, requires = "init")]
    force: bool,
}

pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    if let Some(path) = &args.init {
        if path.exists() && !args.force {
            anyhow::bail!(
                "{} already exists (use --force to overwrite)",
                path.display()
            );
        }
        SessionConfig::default()
            .save(path)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    let (config, source) = load_config(args.config.as_deref())?;
    match source {
        Some(path) => println!("# source: {}", path.display()),
        None => println!(
            "# source: defaults (no file at ./patchbay.toml or {})",
            user_config_file().display()
        ),
    }
    print!("{}", config.to_toml()?);
    Ok(())
}
