//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

use crate::cli::OutputFormat;

/// Output selection shared by listing commands
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

/// Arguments for the formats command
#[derive(Args, Debug)]
pub struct FormatsArgs {
    /// YouTube URL
    pub url: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// How to pick the encoding to download
#[derive(Args, Debug, Clone, Default)]
pub struct QualityArgs {
    /// Quality level (720p, 1080p, 1440p, 4K); must be offered by the video
    #[arg(short, long, conflicts_with = "format_id")]
    pub quality: Option<String>,

    /// Exact format id as listed by `formats`
    #[arg(long)]
    pub format_id: Option<String>,

    /// Let the service choose the quality
    #[arg(long, conflicts_with_all = ["quality", "format_id"])]
    pub auto_quality: bool,
}

/// What to do once a job is accepted
#[derive(Args, Debug, Clone, Default)]
pub struct FollowArgs {
    /// Return right after submission instead of following the job
    #[arg(long)]
    pub no_wait: bool,

    /// Write the clip archive here once the job completes
    #[arg(long)]
    pub fetch: Option<PathBuf>,
}

/// Clip definitions, from flags and/or a JSON file
#[derive(Args, Debug, Clone, Default)]
pub struct ClipListArgs {
    /// Clip as START,END[,TITLE] with HH:MM:SS times; repeatable
    #[arg(short, long = "clip", value_name = "START,END[,TITLE]")]
    pub clips: Vec<String>,

    /// JSON file with an array of {title?, start_time, end_time}
    #[arg(long)]
    pub clips_file: Option<PathBuf>,
}

/// Arguments for the download command
#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// YouTube URL
    pub url: String,

    #[command(flatten)]
    pub quality: QualityArgs,

    #[command(flatten)]
    pub follow: FollowArgs,
}

/// Arguments for the clip command
#[derive(Args, Debug)]
pub struct ClipArgs {
    /// YouTube URL
    pub url: String,

    #[command(flatten)]
    pub clips: ClipListArgs,

    #[command(flatten)]
    pub quality: QualityArgs,

    /// Use the older combined endpoint (no quality selection)
    #[arg(long, conflicts_with_all = ["quality", "format_id"])]
    pub legacy: bool,

    #[command(flatten)]
    pub follow: FollowArgs,
}

/// Arguments for the clip-video command
#[derive(Args, Debug)]
pub struct ClipVideoArgs {
    /// Downloaded video id (default: the latest download)
    #[arg(long)]
    pub video_id: Option<String>,

    #[command(flatten)]
    pub clips: ClipListArgs,

    #[command(flatten)]
    pub follow: FollowArgs,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Job id, or video id with --video
    pub id: String,

    /// The id belongs to a download job
    #[arg(long)]
    pub video: bool,

    /// Follow the job until it completes or fails
    #[arg(short, long)]
    pub wait: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for the fetch command
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Job id
    pub job_id: String,

    /// Destination file (default: clipscene_<job>_<timestamp>.zip in output_dir)
    #[arg(short = 'f', long)]
    pub file: Option<PathBuf>,
}

/// Arguments for the preview command
#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Downloaded video id (default: the latest download)
    #[arg(long)]
    pub video_id: Option<String>,

    #[command(flatten)]
    pub clips: ClipListArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for the edit command
#[derive(Args, Debug)]
pub struct EditArgs {
    /// Media duration in seconds
    #[arg(short, long, default_value_t = 600.0)]
    pub duration: f64,

    /// Read commands from a file instead of stdin
    #[arg(short, long)]
    pub script: Option<PathBuf>,

    /// YouTube URL; enables format discovery and the `submit` command
    #[arg(long)]
    pub url: Option<String>,

    /// Print the clip list in this format when the session ends
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

/// Arguments for the timecode command
#[derive(Args, Debug)]
pub struct TimecodeArgs {
    /// Whole seconds (e.g. 3661) or a HH:MM:SS timecode
    pub value: String,
}
