//! Line-oriented front end for the range editor
//!
//! Each input line is one pointer or keyboard gesture. Errors in a line are
//! reported and the session continues.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::app::JobOrchestrator;
use crate::catalog::{DiscoveryStatus, FormatCatalog};
use crate::domain::errors::DomainError;
use crate::domain::model::{ClipField, ClipId, JobRequest, Quality};
use crate::editor::{DragTarget, EditorSession};
use crate::utils::time::TimeCodec;

pub const HELP: &str = "\
commands:
  play | pause                      start or stop playback inside the range
  drag <start|end|seek> <fraction>  press, move and release a handle
  press <start|end|seek>            press a handle
  move <fraction>                   move the pressed handle
  release                           release the pressed handle
  click <fraction>                  seek by clicking the track
  wait <ms>                         let playback run
  volume <0..1>                     set the player volume
  add [title]                       commit the range as a clip
  select <n|none>                   select clip n and load its range
  set <n> <title|start|end> <value> edit a stored clip
  apply                             store the range into the selected clip
  remove <n>                        delete clip n
  list | range | formats            show clips, range or formats
  quality <720p|1080p|1440p|4K>     choose the download quality
  submit                            send all clips to the service
  done                              end the session";

/// Result of one shell line
#[derive(Debug, Clone, PartialEq)]
pub enum ShellStep {
    Output(String),
    Quit,
}

pub struct EditorShell {
    session: EditorSession,
    url: Option<String>,
    catalog: Option<Arc<FormatCatalog>>,
    orchestrator: Option<Arc<JobOrchestrator>>,
}

impl EditorShell {
    pub fn new(session: EditorSession) -> Self {
        Self {
            session,
            url: None,
            catalog: None,
            orchestrator: None,
        }
    }

    /// Attach a video URL; format discovery starts in the background
    pub fn with_service(
        mut self,
        url: &str,
        catalog: Arc<FormatCatalog>,
        orchestrator: Arc<JobOrchestrator>,
    ) -> Self {
        catalog.set_url(url);
        self.url = Some(url.to_string());
        self.catalog = Some(catalog);
        self.orchestrator = Some(orchestrator);
        self
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    /// Run one line; domain errors are turned into an error line
    pub async fn handle_line(&mut self, line: &str) -> ShellStep {
        match self.execute(line).await {
            Ok(step) => step,
            Err(error) => {
                warn!(error = %error, "Editor command rejected");
                ShellStep::Output(format!("error: {}", error))
            }
        }
    }

    pub async fn execute(&mut self, line: &str) -> Result<ShellStep, DomainError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(ShellStep::Output(String::new()));
        }
        let (command, rest) = line
            .split_once(char::is_whitespace)
            .map(|(command, rest)| (command, rest.trim()))
            .unwrap_or((line, ""));
        let words: Vec<&str> = rest.split_whitespace().collect();

        let output = match command.to_lowercase().as_str() {
            "help" | "?" => HELP.to_string(),
            "done" | "quit" | "exit" => return Ok(ShellStep::Quit),
            "play" => {
                self.session.scrubber_mut().play();
                self.describe_range()
            }
            "pause" => {
                self.session.scrubber_mut().pause();
                self.describe_range()
            }
            "drag" => {
                let target = DragTarget::parse(arg(&words, 0, "drag target")?)?;
                let fraction = parse_fraction(arg(&words, 1, "position")?)?;
                let scrubber = self.session.scrubber_mut();
                scrubber.begin_drag(target);
                scrubber.update_drag(fraction);
                scrubber.end_drag();
                self.describe_range()
            }
            "press" => {
                let target = DragTarget::parse(arg(&words, 0, "drag target")?)?;
                self.session.scrubber_mut().begin_drag(target);
                String::new()
            }
            "move" => {
                let fraction = parse_fraction(arg(&words, 0, "position")?)?;
                if self.session.scrubber().drag_target().is_none() {
                    return Err(DomainError::Validation("No handle is pressed".to_string()));
                }
                self.session.scrubber_mut().update_drag(fraction);
                self.describe_range()
            }
            "release" => {
                self.session.scrubber_mut().end_drag();
                self.describe_range()
            }
            "click" => {
                let fraction = parse_fraction(arg(&words, 0, "position")?)?;
                self.session.scrubber_mut().click_track(fraction);
                self.describe_range()
            }
            "wait" => {
                let millis: u64 = arg(&words, 0, "milliseconds")?
                    .parse()
                    .map_err(|_| DomainError::Validation("wait expects milliseconds".to_string()))?;
                tokio::time::sleep(Duration::from_millis(millis)).await;
                self.describe_range()
            }
            "volume" => {
                let volume: f32 = arg(&words, 0, "volume")?
                    .parse()
                    .map_err(|_| DomainError::Validation("volume expects a number".to_string()))?;
                self.session.scrubber().set_volume(volume);
                String::new()
            }
            "add" => {
                let title = (!rest.is_empty()).then_some(rest);
                self.session.commit_range(title);
                format!("added clip {}", self.session.clips().len())
            }
            "select" => {
                let target = arg(&words, 0, "clip number")?;
                let id = if target.eq_ignore_ascii_case("none") {
                    None
                } else {
                    Some(self.clip_at(target)?)
                };
                self.session.select_clip(id)?;
                self.describe_range()
            }
            "set" => {
                let id = self.clip_at(arg(&words, 0, "clip number")?)?;
                let field = ClipField::parse(arg(&words, 1, "field")?)?;
                let value = words.get(2..).map(|rest| rest.join(" ")).unwrap_or_default();
                self.session.update_clip_field(id, field, &value)?;
                self.describe_clips()
            }
            "apply" => {
                self.session.apply_range_to_selected()?;
                self.describe_clips()
            }
            "remove" => {
                let id = self.clip_at(arg(&words, 0, "clip number")?)?;
                self.session.remove_clip(id)?;
                self.describe_clips()
            }
            "list" => self.describe_clips(),
            "range" => self.describe_range(),
            "formats" => self.describe_formats().await?,
            "quality" => {
                let quality = Quality::parse(arg(&words, 0, "quality")?)?;
                let catalog = self.catalog()?;
                catalog.settled().await?;
                catalog.select_quality(quality)?;
                format!("quality {}", quality)
            }
            "submit" => self.submit().await?,
            other => {
                return Err(DomainError::Validation(format!(
                    "Unknown command: {}. Type `help` for a list",
                    other
                )))
            }
        };
        Ok(ShellStep::Output(output))
    }

    fn clip_at(&self, number: &str) -> Result<ClipId, DomainError> {
        let index: usize = number
            .parse()
            .map_err(|_| DomainError::Validation(format!("Invalid clip number: {}", number)))?;
        index
            .checked_sub(1)
            .and_then(|index| self.session.clips().get_index(index))
            .map(|clip| clip.id)
            .ok_or_else(|| DomainError::NotFound(format!("clip {}", number)))
    }

    fn catalog(&self) -> Result<&Arc<FormatCatalog>, DomainError> {
        self.catalog
            .as_ref()
            .ok_or_else(|| DomainError::Validation("Start the editor with --url to use formats".to_string()))
    }

    pub fn describe_range(&self) -> String {
        let scrubber = self.session.scrubber();
        let range = scrubber.range();
        format!(
            "range {} - {} cursor {}{}",
            TimeCodec::from_seconds_f64(range.start_seconds),
            TimeCodec::from_seconds_f64(range.end_seconds),
            TimeCodec::from_seconds_f64(scrubber.cursor()),
            if scrubber.is_sampling() { " (playing)" } else { "" }
        )
    }

    pub fn describe_clips(&self) -> String {
        if self.session.clips().is_empty() {
            return "no clips".to_string();
        }
        let selected = self.session.selected();
        self.session
            .clips()
            .iter()
            .enumerate()
            .map(|(index, clip)| {
                format!(
                    "{}{}. {} [{} - {}]",
                    if selected == Some(clip.id) { "*" } else { " " },
                    index + 1,
                    clip.title.as_deref().unwrap_or("(untitled)"),
                    clip.start_time,
                    clip.end_time
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    async fn describe_formats(&self) -> Result<String, DomainError> {
        let snapshot = self.catalog()?.settled().await?;
        Ok(match &snapshot.status {
            DiscoveryStatus::Ready => {
                let qualities: Vec<String> = snapshot
                    .available_qualities()
                    .iter()
                    .map(|quality| {
                        if snapshot.selected_quality == Some(*quality) {
                            format!("[{}]", quality)
                        } else {
                            quality.to_string()
                        }
                    })
                    .collect();
                format!("qualities: {}", qualities.join(" "))
            }
            DiscoveryStatus::Failed(message) => format!("format discovery failed: {}", message),
            DiscoveryStatus::Invalid => "invalid URL".to_string(),
            _ => "no formats".to_string(),
        })
    }

    async fn submit(&mut self) -> Result<String, DomainError> {
        let (Some(url), Some(orchestrator)) = (self.url.clone(), self.orchestrator.clone()) else {
            return Err(DomainError::Validation(
                "Start the editor with --url to submit clips".to_string(),
            ));
        };
        let format_id = match &self.catalog {
            Some(catalog) => catalog.settled().await?.selected_format().map(|f| f.format_id.clone()),
            None => None,
        };

        let handle = orchestrator
            .submit(JobRequest::Unified {
                youtube_url: url,
                clips: self.session.clip_data(),
                format_id,
            })
            .await?;

        let mut lines = vec![format!("submitted job {}", handle.id)];
        let last = orchestrator
            .poll_until_terminal(&handle, |snapshot| {
                lines.push(format!(
                    "{} {:.0}% ({}/{} clips)",
                    snapshot.phase,
                    snapshot.progress_percent,
                    snapshot.completed_clips,
                    snapshot.total_clips
                ));
            })
            .await?;
        lines.push(format!("job {} produced {} clips", last.job_id, last.clips.len()));
        Ok(lines.join("\n"))
    }
}

fn arg<'a>(words: &[&'a str], index: usize, name: &str) -> Result<&'a str, DomainError> {
    words
        .get(index)
        .copied()
        .ok_or_else(|| DomainError::Validation(format!("Missing {}", name)))
}

fn parse_fraction(value: &str) -> Result<f64, DomainError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|fraction| fraction.is_finite())
        .ok_or_else(|| DomainError::Validation(format!("Invalid track position: {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{ScriptedClipService, SimulatedPlayer};
    use crate::editor::DEFAULT_SAMPLE_PERIOD;

    fn shell(duration: f64) -> EditorShell {
        let player = Arc::new(SimulatedPlayer::new(duration));
        EditorShell::new(EditorSession::new(player, DEFAULT_SAMPLE_PERIOD).unwrap())
    }

    async fn run(shell: &mut EditorShell, line: &str) -> String {
        match shell.handle_line(line).await {
            ShellStep::Output(output) => output,
            ShellStep::Quit => "<quit>".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_drag_add_and_list() {
        let mut shell = shell(100.0);
        assert_eq!(
            run(&mut shell, "drag start 0.1").await,
            "range 00:00:10 - 00:01:40 cursor 00:00:10"
        );
        run(&mut shell, "drag end 0.3").await;
        run(&mut shell, "add Opening scene").await;
        run(&mut shell, "drag end 0.9").await;
        run(&mut shell, "add").await;

        assert_eq!(
            run(&mut shell, "list").await,
            " 1. Opening scene [00:00:10 - 00:00:30]\n 2. (untitled) [00:00:10 - 00:01:30]"
        );
        assert_eq!(run(&mut shell, "done").await, "<quit>");
    }

    #[tokio::test(start_paused = true)]
    async fn test_playback_stops_at_out_point() {
        let mut shell = shell(100.0);
        run(&mut shell, "drag start 0.1").await;
        run(&mut shell, "drag end 0.15").await;
        assert!(run(&mut shell, "play").await.ends_with("(playing)"));

        let output = run(&mut shell, "wait 8000").await;
        assert_eq!(output, "range 00:00:10 - 00:00:15 cursor 00:00:15");
    }

    #[tokio::test(start_paused = true)]
    async fn test_errors_do_not_end_session() {
        let mut shell = shell(100.0);
        assert!(run(&mut shell, "select 3").await.starts_with("error:"));
        assert!(run(&mut shell, "drag sideways 0.5").await.starts_with("error:"));
        assert!(run(&mut shell, "frobnicate").await.starts_with("error:"));
        assert!(run(&mut shell, "submit").await.starts_with("error:"));
        assert_eq!(run(&mut shell, "# comment").await, "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_and_edit_clip() {
        let mut shell = shell(100.0);
        run(&mut shell, "drag end 0.5").await;
        run(&mut shell, "add").await;
        run(&mut shell, "set 1 start 00:00:20").await;
        assert_eq!(
            run(&mut shell, "select 1").await,
            "range 00:00:20 - 00:00:50 cursor 00:00:20"
        );
        run(&mut shell, "drag end 0.6").await;
        run(&mut shell, "apply").await;
        assert_eq!(run(&mut shell, "list").await, "*1. (untitled) [00:00:20 - 00:01:00]");
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_follows_job() {
        let service = Arc::new(ScriptedClipService::demo());
        let catalog = Arc::new(
            FormatCatalog::new(service.clone(), Duration::from_millis(10), Vec::new()).unwrap(),
        );
        let orchestrator =
            Arc::new(JobOrchestrator::new(service.clone(), Duration::from_millis(10)).unwrap());
        let mut shell = shell(100.0).with_service("https://youtu.be/demo", catalog, orchestrator);

        assert_eq!(run(&mut shell, "formats").await, "qualities: 720p [1080p] 1440p 4K");
        run(&mut shell, "quality 720p").await;
        run(&mut shell, "drag end 0.2").await;
        run(&mut shell, "add Intro").await;

        let output = run(&mut shell, "submit").await;
        assert!(output.starts_with("submitted job job-1"));
        assert!(output.ends_with("job job-1 produced 1 clips"));
        assert!(service.calls().contains(&"POST /download-and-create-clips".to_string()));
    }
}
