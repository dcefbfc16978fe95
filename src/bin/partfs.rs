//! Partfs CLI Binary
//!
//! Command-line interface for on-disk partitions.

use anyhow::Context;
use clap::Parser;
use partfs::config::ConfigLoader;
use partfs::logging::init_logging;
use partfs::tooling::cli::{Cli, CliContext};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(root) = &cli.root {
        config.storage.root = Some(root.clone());
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    init_logging(&config.logging).context("Failed to initialize logging")?;

    let context = CliContext::from_config(&config).context("Failed to open storage")?;
    let output = context.execute(&cli.command)?;
    output
        .write_to(&mut std::io::stdout().lock())
        .context("Failed to write output")?;
    Ok(())
}
