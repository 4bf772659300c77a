//! CLI module for ClipScene
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::errors::DomainError;
use crate::utils::logging::{LogFormat, LogLevel, LoggingConfig, ProgressConfig};

pub mod args;
pub mod commands;
pub mod editor_shell;

/// ClipScene CLI
///
/// Pick time ranges on a video and drive clip jobs on a ClipScene
/// processing service.
#[derive(Parser, Debug)]
#[command(name = "clipscene")]
#[command(about = "ClipScene - Cut clips from online videos through a processing service")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (RUST_LOG overrides it)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// Log output format: pretty, compact or json
    #[arg(long, default_value = "compact", global = true)]
    pub log_format: String,

    /// Job progress lines: simple, bar, minimal or none
    #[arg(long, default_value = "bar", global = true)]
    pub progress_style: String,

    /// Configuration file (default: clipscene.toml, then config/clipscene.toml)
    #[arg(long, env = "CLIPSCENE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the processing service
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Delay between two status requests, in milliseconds
    #[arg(long, global = true)]
    pub poll_interval_ms: Option<u64>,

    /// Talk to an in-memory demo service instead of the network
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn logging_config(&self) -> Result<LoggingConfig, DomainError> {
        Ok(LoggingConfig {
            level: LogLevel::parse(&self.log_level)?,
            format: LogFormat::parse(&self.log_format)?,
            progress: ProgressConfig::parse(&self.progress_style)?,
            ..LoggingConfig::default()
        })
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the downloadable formats of a video
    Formats(args::FormatsArgs),
    /// Download a video to the service without clipping it
    Download(args::DownloadArgs),
    /// Download a video and cut clips from it in one job
    Clip(args::ClipArgs),
    /// Cut clips from a video the service already downloaded
    ClipVideo(args::ClipVideoArgs),
    /// Show or follow the status of a job
    Status(args::StatusArgs),
    /// Download the zip archive of a completed job
    Fetch(args::FetchArgs),
    /// List downloaded videos
    Videos(args::OutputArgs),
    /// Show the most recently downloaded video
    Latest(args::OutputArgs),
    /// Describe the clips a job would produce
    Preview(args::PreviewArgs),
    /// Check that the service is reachable
    Health,
    /// Interactive range editor driven by text commands
    Edit(args::EditArgs),
    /// Convert between seconds and HH:MM:SS
    Timecode(args::TimecodeArgs),
    /// Print the effective configuration
    Config(args::OutputArgs),
}

/// Output format for listing commands
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::logging::ProgressStyle;

    #[test]
    fn test_progress_style_flag() {
        let cli = Cli::try_parse_from(["clipscene", "--progress-style", "simple", "health"]).unwrap();
        let config = cli.logging_config().unwrap();
        assert!(config.progress.enabled);
        assert_eq!(config.progress.style, ProgressStyle::Simple);

        let cli = Cli::try_parse_from(["clipscene", "health"]).unwrap();
        assert_eq!(cli.logging_config().unwrap().progress.style, ProgressStyle::Bar);

        let cli = Cli::try_parse_from(["clipscene", "health", "--progress-style", "dots"]).unwrap();
        assert!(cli.logging_config().is_err());
    }
}
