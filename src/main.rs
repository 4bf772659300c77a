//! ClipScene CLI
//!
//! Cut clips from online videos through a ClipScene processing service.
//!
//! # Usage
//!
//! ```bash
//! clipscene formats "https://youtu.be/VIDEO"
//! clipscene clip "https://youtu.be/VIDEO" --clip 00:01:00,00:01:30,Intro --quality 1080p
//! clipscene status JOB_ID --wait
//! clipscene edit --duration 300 --url "https://youtu.be/VIDEO"
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use clipscene_cli::app::DefaultAppContainer;
use clipscene_cli::cli::{commands, Cli};
use clipscene_cli::config_initialization::initialize_configuration_hierarchy;
use clipscene_cli::utils::logging::LoggingSystem;

/// Main entry point for the ClipScene CLI application
#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    let logging = LoggingSystem::new(cli.logging_config()?);
    logging.initialize()?;

    let config = initialize_configuration_hierarchy(&cli)?;
    let container = if cli.dry_run {
        DefaultAppContainer::dry_run(config)
    } else {
        DefaultAppContainer::new(config)
    }
    .context("Failed to set up the application")?;

    info!("Starting ClipScene CLI");
    commands::run(cli.command, &container, &logging).await
}
