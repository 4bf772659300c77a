//! Command implementations

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::adapters::{SimulatedPlayer, TomlConfigAdapter};
use crate::app::{AppContainer, JobOrchestrator};
use crate::catalog::{CatalogSnapshot, DiscoveryStatus};
use crate::cli::args::*;
use crate::cli::editor_shell::{EditorShell, ShellStep};
use crate::cli::{Commands, OutputFormat};
use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::editor::EditorSession;
use crate::error::{ClipSceneError, ClipSceneResult};
use crate::utils::logging::LoggingSystem;
use crate::utils::time::TimeCodec;
use crate::utils::Utils;

/// Execute a parsed command against the wired application
pub async fn run(command: Commands, container: &dyn AppContainer, logging: &LoggingSystem) -> Result<()> {
    match command {
        Commands::Formats(args) => formats(args, container).await,
        Commands::Download(args) => download(args, container, logging).await,
        Commands::Clip(args) => clip(args, container, logging).await,
        Commands::ClipVideo(args) => clip_video(args, container, logging).await,
        Commands::Status(args) => status(args, container, logging).await,
        Commands::Fetch(args) => fetch(args, container).await,
        Commands::Videos(args) => videos(args, container).await,
        Commands::Latest(args) => latest(args, container).await,
        Commands::Preview(args) => preview(args, container).await,
        Commands::Health => health(container).await,
        Commands::Edit(args) => edit(args, container).await,
        Commands::Timecode(args) => timecode(args),
        Commands::Config(args) => show_config(args, container),
    }
}

#[derive(Serialize)]
struct FormatsReport {
    youtube_url: String,
    formats: Vec<FormatDescriptor>,
    available_qualities: Vec<Quality>,
    selected_quality: Option<Quality>,
}

/// Execute the formats command
pub async fn formats(args: FormatsArgs, container: &dyn AppContainer) -> Result<()> {
    let snapshot = discover(container, &args.url).await?;
    if let DiscoveryStatus::Failed(message) = &snapshot.status {
        bail!("{}", message);
    }

    let report = FormatsReport {
        youtube_url: snapshot.url.clone(),
        available_qualities: snapshot.available_qualities(),
        selected_quality: snapshot.selected_quality,
        formats: snapshot.formats.clone(),
    };
    emit(args.output.output, &report, || render_formats(&report))?;
    Ok(())
}

fn render_formats(report: &FormatsReport) -> String {
    if report.formats.is_empty() {
        return "No downloadable formats found".to_string();
    }
    let mut lines: Vec<String> = report
        .formats
        .iter()
        .map(|format| {
            format!(
                "{:>6}  {:<24} {:<5} {:>12}  {}",
                format.format_id,
                format.quality_label,
                format.ext,
                Utils::format_megabytes(format.filesize_mb),
                format.note
            )
        })
        .collect();
    let qualities: Vec<String> = report
        .available_qualities
        .iter()
        .map(Quality::to_string)
        .collect();
    lines.push(format!("Available qualities: {}", qualities.join(", ")));
    if let Some(quality) = report.selected_quality {
        lines.push(format!("Default quality: {}", quality));
    }
    lines.join("\n")
}

/// Execute the download command
pub async fn download(args: DownloadArgs, container: &dyn AppContainer, logging: &LoggingSystem) -> Result<()> {
    if args.follow.fetch.is_some() {
        bail!("--fetch only applies to clip jobs");
    }
    let format_id = resolve_format_id(container, &args.url, &args.quality).await?;
    let orchestrator = container.orchestrator();
    let handle = orchestrator
        .submit(JobRequest::Download {
            youtube_url: args.url,
            format_id,
        })
        .await?;
    println!("Download started: video id {}", handle.id);

    if args.follow.no_wait {
        return Ok(());
    }
    let last = follow(&orchestrator, &handle, logging).await?;
    println!("{}", render_snapshot(&last));
    Ok(())
}

/// Execute the clip command
pub async fn clip(args: ClipArgs, container: &dyn AppContainer, logging: &LoggingSystem) -> Result<()> {
    let clips = load_clips(&args.clips).await?;
    let request = if args.legacy {
        JobRequest::Legacy {
            youtube_url: args.url,
            clips,
        }
    } else {
        let format_id = resolve_format_id(container, &args.url, &args.quality).await?;
        JobRequest::Unified {
            youtube_url: args.url,
            clips,
            format_id,
        }
    };
    submit_and_follow(request, &args.follow, container, logging).await
}

/// Execute the clip-video command
pub async fn clip_video(args: ClipVideoArgs, container: &dyn AppContainer, logging: &LoggingSystem) -> Result<()> {
    let clips = load_clips(&args.clips).await?;
    let request = JobRequest::FromVideo {
        video_id: args.video_id,
        clips,
    };
    submit_and_follow(request, &args.follow, container, logging).await
}

async fn submit_and_follow(
    request: JobRequest,
    follow_args: &FollowArgs,
    container: &dyn AppContainer,
    logging: &LoggingSystem,
) -> Result<()> {
    let orchestrator = container.orchestrator();
    let total = request.clips().len();
    let handle = orchestrator.submit(request).await?;
    println!("Job started: {} ({} clips)", handle.id, total);

    if follow_args.no_wait {
        return Ok(());
    }
    let last = follow(&orchestrator, &handle, logging).await?;
    println!("{}", render_snapshot(&last));

    if let Some(path) = &follow_args.fetch {
        let archive = orchestrator.fetch_archive(&handle.id).await?;
        write_archive(path, &archive).await?;
    }
    Ok(())
}

/// Execute the status command
pub async fn status(args: StatusArgs, container: &dyn AppContainer, logging: &LoggingSystem) -> Result<()> {
    let handle = if args.video {
        JobHandle::video_download(args.id)
    } else {
        JobHandle::clip_job(args.id)
    };
    let orchestrator = container.orchestrator();
    let snapshot = if args.wait {
        follow(&orchestrator, &handle, logging).await?
    } else {
        orchestrator.fetch_snapshot(&handle).await?
    };
    emit(args.output.output, &snapshot, || render_snapshot(&snapshot))?;
    Ok(())
}

/// Execute the fetch command
pub async fn fetch(args: FetchArgs, container: &dyn AppContainer) -> Result<()> {
    let archive = container.orchestrator().fetch_archive(&args.job_id).await?;
    let path = args.file.unwrap_or_else(|| {
        container
            .config()
            .output_dir
            .join(default_archive_name(&args.job_id))
    });
    write_archive(&path, &archive).await
}

/// Execute the videos command
pub async fn videos(args: OutputArgs, container: &dyn AppContainer) -> Result<()> {
    let videos = container.orchestrator().list_videos().await?;
    emit(args.output, &videos, || {
        if videos.is_empty() {
            return "No downloaded videos".to_string();
        }
        videos
            .iter()
            .map(|video| {
                format!(
                    "{}  {}  {}  {}",
                    video.video_id,
                    video.title.as_deref().unwrap_or("(untitled)"),
                    Utils::format_file_size(video.file_size),
                    video.youtube_url
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    })?;
    Ok(())
}

/// Execute the latest command
pub async fn latest(args: OutputArgs, container: &dyn AppContainer) -> Result<()> {
    let video = container.orchestrator().latest_video().await?;
    emit(args.output, &video, || {
        format!(
            "{}\n  file: {}\n  size: {}\n  path: {}",
            video.title,
            video.filename,
            Utils::format_file_size(video.size),
            video.path
        )
    })?;
    Ok(())
}

/// Execute the preview command
pub async fn preview(args: PreviewArgs, container: &dyn AppContainer) -> Result<()> {
    let clips = load_clips(&args.clips).await?;
    let preview = container
        .orchestrator()
        .preview_clips(args.video_id, clips)
        .await?;
    emit(args.output.output, &preview, || {
        let mut lines = vec![format!(
            "{} ({}), {} clips",
            preview.video.title.as_deref().unwrap_or("(untitled)"),
            Utils::format_file_size(preview.video.file_size),
            preview.total_clips
        )];
        for clip in &preview.clips {
            lines.push(format!(
                "  {}. {} [{} - {}] {}",
                clip.index + 1,
                clip.title,
                clip.start_time,
                clip.end_time,
                clip.duration
            ));
        }
        lines.join("\n")
    })?;
    Ok(())
}

/// Execute the health command
pub async fn health(container: &dyn AppContainer) -> Result<()> {
    let message = container
        .orchestrator()
        .health()
        .await
        .with_context(|| format!("Service at {} is not reachable", container.config().base_url))?;
    println!("{}", message);
    Ok(())
}

/// Execute the edit command
pub async fn edit(args: EditArgs, container: &dyn AppContainer) -> Result<()> {
    let player = Arc::new(SimulatedPlayer::new(args.duration));
    let session = EditorSession::new(player, container.config().sample_period())?;
    let mut shell = EditorShell::new(session);
    if let Some(url) = &args.url {
        shell = shell.with_service(url, container.catalog(), container.orchestrator());
    }

    match &args.script {
        Some(path) => {
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read editor script {}", path.display()))?;
            for line in content.lines() {
                if step(&mut shell, line).await {
                    break;
                }
            }
        }
        None => {
            eprintln!("Type `help` for commands, `done` to finish");
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
                if step(&mut shell, &line).await {
                    break;
                }
            }
        }
    }

    let session = shell.session();
    info!(clips = session.clips().len(), "Editor session finished");
    let clips = session.clip_data();
    emit(args.output, &clips, || shell.describe_clips())?;
    Ok(())
}

async fn step(shell: &mut EditorShell, line: &str) -> bool {
    match shell.handle_line(line).await {
        ShellStep::Output(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            false
        }
        ShellStep::Quit => true,
    }
}

/// Execute the timecode command
pub fn timecode(args: TimecodeArgs) -> Result<()> {
    let value = args.value.trim();
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        let seconds: u64 = value.parse().context("Number of seconds is too large")?;
        println!("{}", TimeCodec::to_timecode(seconds));
    } else if TimeCodec::is_valid_timecode_format(value) {
        println!("{}", TimeCodec::parse_timecode(value));
    } else {
        bail!("Expected whole seconds or HH:MM:SS, got {}", value);
    }
    Ok(())
}

/// Execute the config command
pub fn show_config(args: OutputArgs, container: &dyn AppContainer) -> Result<()> {
    let config = container.config();
    let text = TomlConfigAdapter::serialize_config(config)?;
    emit(args.output, config, || text)?;
    Ok(())
}

/// Parse a `START,END[,TITLE]` clip argument
pub fn parse_clip_arg(arg: &str) -> Result<ClipData, DomainError> {
    let mut parts = arg.splitn(3, ',');
    let start = parts.next().map(str::trim).unwrap_or_default();
    let end = parts.next().map(str::trim).unwrap_or_default();
    if start.is_empty() || end.is_empty() {
        return Err(DomainError::Validation(format!(
            "Clip must be START,END[,TITLE], got {}",
            arg
        )));
    }
    let title = parts
        .next()
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(str::to_string);

    Ok(ClipData {
        title,
        start_time: start.to_string(),
        end_time: end.to_string(),
    })
}

async fn load_clips(args: &ClipListArgs) -> Result<Vec<ClipData>> {
    let mut clips = Vec::new();
    if let Some(path) = &args.clips_file {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read clips file {}", path.display()))?;
        let from_file: Vec<ClipData> = serde_json::from_str(&content)
            .with_context(|| format!("Invalid clips file {}", path.display()))?;
        clips.extend(from_file);
    }
    for arg in &args.clips {
        clips.push(parse_clip_arg(arg)?);
    }
    Ok(clips)
}

async fn discover(container: &dyn AppContainer, url: &str) -> Result<CatalogSnapshot> {
    let snapshot = container.catalog().discover_now(url).await?;
    match snapshot.status {
        DiscoveryStatus::Idle => bail!("Please enter a YouTube URL"),
        DiscoveryStatus::Invalid => bail!("Please enter a valid YouTube URL: {}", url),
        _ => Ok(snapshot),
    }
}

/// Format id to request, following the explicit flags or the catalog's choice
async fn resolve_format_id(container: &dyn AppContainer, url: &str, args: &QualityArgs) -> Result<Option<String>> {
    if let Some(format_id) = &args.format_id {
        return Ok(Some(format_id.clone()));
    }
    if args.auto_quality {
        return Ok(None);
    }

    let snapshot = discover(container, url).await?;
    let catalog = container.catalog();
    match &args.quality {
        Some(label) => {
            if let DiscoveryStatus::Failed(message) = &snapshot.status {
                bail!("Cannot check quality {}: {}", label, message);
            }
            catalog.select_quality(Quality::parse(label)?)?;
        }
        None => {
            if let DiscoveryStatus::Failed(message) = &snapshot.status {
                warn!(error = %message, "Format discovery failed, letting the service choose");
                return Ok(None);
            }
        }
    }

    let format = catalog.selected_format();
    if let Some(format) = &format {
        info!(format_id = %format.format_id, label = %format.quality_label, "Selected format");
    }
    Ok(format.map(|format| format.format_id))
}

/// Poll until terminal with progress output; Ctrl-C stops following
async fn follow(orchestrator: &JobOrchestrator, handle: &JobHandle, logging: &LoggingSystem) -> Result<JobSnapshot> {
    let mut reporter = logging.create_progress_reporter();
    reporter.start_operation(&format!("job {}", handle.id));

    let outcome = tokio::select! {
        outcome = orchestrator.poll_until_terminal(handle, |snapshot| reporter.update(snapshot)) => outcome,
        // Dropping the polling future unregisters the loop
        _ = tokio::signal::ctrl_c() => Err(DomainError::Cancelled(handle.id.clone())),
    };

    reporter.complete_operation(outcome.is_ok());
    match outcome {
        Ok(snapshot) => Ok(snapshot),
        Err(DomainError::Cancelled(id)) => {
            bail!("Stopped following job {}; it keeps running on the service", id)
        }
        Err(error) => Err(error.into()),
    }
}

fn render_snapshot(snapshot: &JobSnapshot) -> String {
    let kind = match snapshot.kind {
        JobKind::ClipJob => "clip job",
        JobKind::VideoDownload => "download",
    };
    let mut lines = vec![
        format!("Job: {} ({})", snapshot.job_id, kind),
        format!("Phase: {}", snapshot.phase),
    ];
    if !snapshot.current_step.is_empty() {
        lines.push(format!("Step: {}", snapshot.current_step));
    }
    lines.push(format!(
        "Progress: {:.0}%{}",
        snapshot.progress_percent,
        if snapshot.progress_derived { " (estimated)" } else { "" }
    ));

    if snapshot.kind == JobKind::ClipJob {
        lines.push(format!(
            "Clips: {}/{}",
            snapshot.completed_clips, snapshot.total_clips
        ));
        for clip in &snapshot.clips {
            lines.push(format!(
                "  {}. {} [{} - {}] {} ({})",
                clip.index + 1,
                clip.title,
                clip.start_time,
                clip.end_time,
                clip.file_path,
                Utils::format_file_size(clip.file_size)
            ));
        }
    } else {
        if let Some(title) = &snapshot.title {
            lines.push(format!("Title: {}", title));
        }
        if let Some(path) = &snapshot.file_path {
            lines.push(format!(
                "File: {} ({})",
                path,
                Utils::format_file_size(snapshot.file_size)
            ));
        }
    }
    if let Some(error) = &snapshot.error {
        lines.push(format!("Error: {}", error));
    }
    lines.join("\n")
}

fn default_archive_name(job_id: &str) -> String {
    format!(
        "clipscene_{}_{}.zip",
        job_id,
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    )
}

async fn write_archive(path: &Path, archive: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(ClipSceneError::from)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    tokio::fs::write(path, archive)
        .await
        .map_err(ClipSceneError::from)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!(
        "Saved {} ({})",
        path.display(),
        Utils::format_file_size(archive.len() as u64)
    );
    Ok(())
}

/// Print `value` in the requested format; `text` renders the human-readable form
fn emit<T: Serialize>(format: OutputFormat, value: &T, text: impl FnOnce() -> String) -> ClipSceneResult<()> {
    let rendered = match format {
        OutputFormat::Text => text(),
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clip_arg() {
        let clip = parse_clip_arg("00:00:10,00:00:20, Intro, part 1").unwrap();
        assert_eq!(clip.start_time, "00:00:10");
        assert_eq!(clip.end_time, "00:00:20");
        assert_eq!(clip.title.as_deref(), Some("Intro, part 1"));

        let clip = parse_clip_arg("00:01:00,00:02:00").unwrap();
        assert_eq!(clip.title, None);

        assert!(parse_clip_arg("00:01:00").unwrap_err().is_validation());
        assert!(parse_clip_arg(",00:01:00").is_err());
    }

    #[test]
    fn test_render_snapshot_for_download() {
        let (snapshot, _) = JobSnapshot::from_video_status(
            "v1",
            VideoStatusResponse {
                status: "completed".to_string(),
                title: Some("Talk".to_string()),
                file_path: Some("downloads/v1.mp4".to_string()),
                file_size: 2048,
                ..Default::default()
            },
        );
        let text = render_snapshot(&snapshot);
        assert!(text.contains("Job: v1 (download)"));
        assert!(text.contains("Title: Talk"));
        assert!(text.contains("File: downloads/v1.mp4 (2.00 KB)"));
    }

    #[test]
    fn test_default_archive_name() {
        let name = default_archive_name("abc");
        assert!(name.starts_with("clipscene_abc_"));
        assert!(name.ends_with(".zip"));
    }

    #[tokio::test]
    async fn test_load_clips_from_file_and_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clips.json");
        std::fs::write(
            &path,
            r#"[{"title": "A", "start_time": "00:00:01", "end_time": "00:00:05"}]"#,
        )
        .unwrap();

        let clips = load_clips(&ClipListArgs {
            clips: vec!["00:00:10,00:00:20".to_string()],
            clips_file: Some(path),
        })
        .await
        .unwrap();
        assert_eq!(clips.len(), 2);
        assert_eq!(clips[0].title.as_deref(), Some("A"));
        assert_eq!(clips[1].start_time, "00:00:10");
    }
}
