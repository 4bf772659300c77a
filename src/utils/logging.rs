//! Logging configuration and job progress output

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::domain::errors::DomainError;
use crate::domain::model::{JobPhase, JobSnapshot};
use crate::error::{ClipSceneError, ClipSceneResult};

/// Logging configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Global log level; `RUST_LOG` takes precedence when set
    pub level: LogLevel,
    /// Output format
    pub format: LogFormat,
    /// Include target module information
    pub target: bool,
    /// Progress reporting configuration
    pub progress: ProgressConfig,
}

/// Log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn parse(level: &str) -> Result<Self, DomainError> {
        match level.trim().to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(DomainError::Config(format!(
                "Invalid log level: {}. Valid levels: error, warn, info, debug, trace",
                level
            ))),
        }
    }

    fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    /// Human-readable multi-line format
    Pretty,
    /// Compact single-line format
    Compact,
    /// JSON format for structured logging
    Json,
}

impl LogFormat {
    pub fn parse(format: &str) -> Result<Self, DomainError> {
        match format.trim().to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(DomainError::Config(format!(
                "Invalid log format: {}. Valid formats: pretty, compact, json",
                format
            ))),
        }
    }
}

/// Progress reporting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Print progress lines at all
    pub enabled: bool,
    pub style: ProgressStyle,
}

/// Progress line style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressStyle {
    /// Percentage and step description
    Simple,
    /// ASCII bar followed by the step
    Bar,
    /// Percentage only
    Minimal,
}

impl ProgressConfig {
    /// Parse a style name; `none` turns progress lines off
    pub fn parse(style: &str) -> Result<Self, DomainError> {
        let style = match style.trim().to_lowercase().as_str() {
            "none" | "off" => {
                return Ok(Self {
                    enabled: false,
                    style: ProgressStyle::Bar,
                })
            }
            "simple" => ProgressStyle::Simple,
            "bar" => ProgressStyle::Bar,
            "minimal" => ProgressStyle::Minimal,
            _ => {
                return Err(DomainError::Config(format!(
                    "Invalid progress style: {}. Valid styles: simple, bar, minimal, none",
                    style
                )))
            }
        };
        Ok(Self {
            enabled: true,
            style,
        })
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            target: false,
            progress: ProgressConfig {
                enabled: true,
                style: ProgressStyle::Bar,
            },
        }
    }
}

/// Logging system manager
pub struct LoggingSystem {
    config: LoggingConfig,
}

impl Default for LoggingSystem {
    fn default() -> Self {
        Self::new(LoggingConfig::default())
    }
}

impl LoggingSystem {
    pub fn new(config: LoggingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoggingConfig {
        &self.config
    }

    /// Install the global subscriber; logs go to stderr so stdout stays parseable
    pub fn initialize(&self) -> ClipSceneResult<()> {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.config.level.as_filter()));

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(self.config.target);

        let result = match self.config.format {
            LogFormat::Pretty => builder.pretty().try_init(),
            LogFormat::Compact => builder.compact().try_init(),
            LogFormat::Json => builder.json().try_init(),
        };
        result.map_err(|e| ClipSceneError::LoggingInit {
            message: e.to_string(),
        })?;

        tracing::debug!(level = ?self.config.level, format = ?self.config.format, "Logging initialized");
        Ok(())
    }

    pub fn create_progress_reporter(&self) -> ProgressReporter {
        ProgressReporter::new(self.config.progress.clone())
    }
}

/// Progress output for a followed job
pub struct ProgressReporter {
    config: ProgressConfig,
    current_operation: Option<String>,
    start_time: Option<Instant>,
    last_line: Option<String>,
}

impl ProgressReporter {
    pub fn new(config: ProgressConfig) -> Self {
        Self {
            config,
            current_operation: None,
            start_time: None,
            last_line: None,
        }
    }

    pub fn start_operation(&mut self, operation: &str) {
        self.current_operation = Some(operation.to_string());
        self.start_time = Some(Instant::now());
        self.last_line = None;
        tracing::info!(operation, "Starting");
    }

    /// Print a line for `snapshot` unless it repeats the previous one
    pub fn update(&mut self, snapshot: &JobSnapshot) {
        if !self.config.enabled {
            return;
        }
        let line = self.render(snapshot);
        if self.last_line.as_deref() != Some(line.as_str()) {
            eprintln!("{}", line);
            self.last_line = Some(line);
        }
    }

    /// Format one progress line
    pub fn render(&self, snapshot: &JobSnapshot) -> String {
        let percent = snapshot.progress_percent.clamp(0.0, 100.0);
        // Estimated values are marked so they are not mistaken for service data
        let marker = if snapshot.progress_derived { "~" } else { "" };
        let step = describe_step(snapshot);

        match self.config.style {
            ProgressStyle::Simple => format!("[{}{:>3.0}%] {}", marker, percent, step),
            ProgressStyle::Bar => {
                let bar_length = 20;
                let filled = ((percent / 100.0) * bar_length as f64).round() as usize;
                let bar = "#".repeat(filled) + &"-".repeat(bar_length - filled);
                format!("[{}] {}{:>3.0}% {}", bar, marker, percent, step)
            }
            ProgressStyle::Minimal => format!("{}{:>3.0}%", marker, percent),
        }
    }

    pub fn complete_operation(&mut self, success: bool) {
        if let Some(operation) = &self.current_operation {
            let elapsed = self
                .start_time
                .map(|start| start.elapsed().as_secs_f64())
                .unwrap_or(0.0);
            if success {
                tracing::info!(operation = %operation, elapsed_secs = elapsed, "Completed");
            } else {
                tracing::warn!(operation = %operation, elapsed_secs = elapsed, "Failed");
            }
        }
        self.current_operation = None;
        self.start_time = None;
    }
}

fn describe_step(snapshot: &JobSnapshot) -> String {
    let mut step = if snapshot.current_step.is_empty() {
        snapshot.phase.to_string()
    } else {
        snapshot.current_step.clone()
    };
    if snapshot.total_clips > 0 && snapshot.phase != JobPhase::Downloading {
        step.push_str(&format!(
            " ({}/{} clips)",
            snapshot.completed_clips, snapshot.total_clips
        ));
    }
    step
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::JobHandle;

    fn snapshot(phase: JobPhase, completed: u32, percent: f64, derived: bool) -> JobSnapshot {
        let mut snapshot = JobSnapshot::submitted(&JobHandle::clip_job("j"), 4);
        snapshot.phase = phase;
        snapshot.completed_clips = completed;
        snapshot.progress_percent = percent;
        snapshot.progress_derived = derived;
        snapshot
    }

    fn reporter(style: ProgressStyle) -> ProgressReporter {
        ProgressReporter::new(ProgressConfig {
            enabled: true,
            style,
        })
    }

    #[test]
    fn test_parse_levels_and_formats() {
        assert_eq!(LogLevel::parse("WARNING").unwrap(), LogLevel::Warn);
        assert!(LogLevel::parse("loud").is_err());
        assert_eq!(LogFormat::parse("json").unwrap(), LogFormat::Json);
        assert!(LogFormat::parse("xml").is_err());
    }

    #[test]
    fn test_progress_style_parsing() {
        let minimal = ProgressConfig::parse("Minimal").unwrap();
        assert!(minimal.enabled);
        assert_eq!(minimal.style, ProgressStyle::Minimal);
        assert!(!ProgressConfig::parse("none").unwrap().enabled);
        assert!(ProgressConfig::parse("spinner").is_err());
    }

    #[test]
    fn test_render_styles() {
        let mut snap = snapshot(JobPhase::Processing, 2, 50.0, false);
        snap.current_step = "Creating clip 3 of 4".to_string();

        assert_eq!(
            reporter(ProgressStyle::Simple).render(&snap),
            "[ 50%] Creating clip 3 of 4 (2/4 clips)"
        );
        assert_eq!(
            reporter(ProgressStyle::Bar).render(&snap),
            "[##########----------]  50% Creating clip 3 of 4 (2/4 clips)"
        );
        assert_eq!(reporter(ProgressStyle::Minimal).render(&snap), " 50%");
    }

    #[test]
    fn test_render_marks_estimates() {
        let snap = snapshot(JobPhase::Downloading, 0, 10.0, true);
        assert_eq!(
            reporter(ProgressStyle::Simple).render(&snap),
            "[~ 10%] Submitted"
        );
    }
}
