// Domain models - Core types and data structures

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::DomainError;

/// Opaque identity of a committed clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClipId(Uuid);

impl ClipId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClipId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ClipId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| DomainError::Validation(format!("Invalid clip id: {}", s)))
    }
}

/// Selected range on the source timeline, in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub start_seconds: f64,
    pub end_seconds: f64,
}

impl TimeRange {
    pub fn new(start_seconds: f64, end_seconds: f64) -> Self {
        Self {
            start_seconds,
            end_seconds,
        }
    }
}

/// A committed clip as stored in the clip set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub id: ClipId,
    pub title: Option<String>,
    pub start_time: String,
    pub end_time: String,
}

impl Clip {
    /// Wire representation sent to the processing service
    pub fn to_clip_data(&self) -> ClipData {
        ClipData {
            title: self.title.clone(),
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone(),
        }
    }
}

/// Editable fields of a committed clip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipField {
    Title,
    StartTime,
    EndTime,
}

impl ClipField {
    pub fn is_time(&self) -> bool {
        matches!(self, ClipField::StartTime | ClipField::EndTime)
    }

    /// Parse field name from user input
    pub fn parse(field: &str) -> Result<Self, DomainError> {
        match field.to_lowercase().as_str() {
            "title" => Ok(ClipField::Title),
            "start" | "start_time" => Ok(ClipField::StartTime),
            "end" | "end_time" => Ok(ClipField::EndTime),
            _ => Err(DomainError::Validation(format!(
                "Unknown clip field: {}. Valid fields: title, start, end",
                field
            ))),
        }
    }
}

/// Clip payload accepted by the processing service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub start_time: String,
    pub end_time: String,
}

/// Quality levels the user can pick from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quality {
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "1440p")]
    P1440,
    #[serde(rename = "4K")]
    P4K,
}

impl Quality {
    pub const ALL: [Quality; 4] = [Quality::P720, Quality::P1080, Quality::P1440, Quality::P4K];

    /// Preference order used when no configuration overrides it
    pub const DEFAULT_PREFERENCE: [Quality; 4] =
        [Quality::P1080, Quality::P1440, Quality::P720, Quality::P4K];

    pub fn label(&self) -> &'static str {
        match self {
            Quality::P720 => "720p",
            Quality::P1080 => "1080p",
            Quality::P1440 => "1440p",
            Quality::P4K => "4K",
        }
    }

    /// Whether a resolution label such as `1920x1080` belongs to this level
    pub fn matches_resolution(&self, resolution: &str) -> bool {
        match self {
            Quality::P720 => resolution.contains("720"),
            Quality::P1080 => resolution.contains("1080"),
            Quality::P1440 => resolution.contains("1440"),
            Quality::P4K => resolution.contains("4K") || resolution.contains("2160"),
        }
    }

    /// Parse quality from user input
    pub fn parse(quality: &str) -> Result<Self, DomainError> {
        match quality.trim().to_lowercase().as_str() {
            "720p" | "720" => Ok(Quality::P720),
            "1080p" | "1080" => Ok(Quality::P1080),
            "1440p" | "1440" => Ok(Quality::P1440),
            "4k" | "2160p" | "2160" => Ok(Quality::P4K),
            _ => Err(DomainError::Validation(format!(
                "Invalid quality: {}. Valid qualities: 720p, 1080p, 1440p, 4K",
                quality
            ))),
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Frame rate as reported by the service; unknown rates arrive as text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrameRate {
    Fps(f64),
    Text(String),
}

impl Default for FrameRate {
    fn default() -> Self {
        FrameRate::Text("Unknown".to_string())
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameRate::Fps(fps) => write!(f, "{}fps", fps),
            FrameRate::Text(text) => write!(f, "{}", text),
        }
    }
}

/// One downloadable encoding of the source video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatDescriptor {
    pub format_id: String,
    #[serde(default)]
    pub quality_label: String,
    #[serde(default)]
    pub resolution: String,
    #[serde(default)]
    pub fps: FrameRate,
    #[serde(default)]
    pub ext: String,
    #[serde(default)]
    pub filesize_mb: Option<f64>,
    #[serde(default)]
    pub note: String,
}

/// Lifecycle phase of a remote job as seen by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    Idle,
    Submitting,
    Downloading,
    Processing,
    Completed,
    Error,
}

impl JobPhase {
    /// Map a service status string onto the phase enumeration
    ///
    /// Both the legacy (`downloading/processing/completed/error`) and the
    /// unified vocabularies land here. Acknowledgement statuses such as
    /// `started` carry no phase information and return `None`.
    pub fn from_status(status: &str) -> Option<Self> {
        match status.trim().to_lowercase().as_str() {
            "downloading" => Some(JobPhase::Downloading),
            "processing" | "clipping" => Some(JobPhase::Processing),
            "completed" | "complete" | "done" => Some(JobPhase::Completed),
            "error" | "failed" => Some(JobPhase::Error),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobPhase::Completed | JobPhase::Error)
    }

    fn rank(&self) -> u8 {
        match self {
            JobPhase::Idle => 0,
            JobPhase::Submitting => 1,
            JobPhase::Downloading => 2,
            JobPhase::Processing => 3,
            JobPhase::Completed | JobPhase::Error => 4,
        }
    }

    /// Forward-only transition check; terminal phases cannot be left
    pub fn can_transition_to(&self, next: JobPhase) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            JobPhase::Error => self.rank() >= JobPhase::Submitting.rank(),
            _ => next.rank() > self.rank(),
        }
    }
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JobPhase::Idle => "idle",
            JobPhase::Submitting => "submitting",
            JobPhase::Downloading => "downloading",
            JobPhase::Processing => "processing",
            JobPhase::Completed => "completed",
            JobPhase::Error => "error",
        };
        write!(f, "{}", label)
    }
}

/// Which status endpoint a job id is polled through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    ClipJob,
    VideoDownload,
}

/// Handle returned by a successful submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    pub id: String,
    pub kind: JobKind,
}

impl JobHandle {
    pub fn clip_job(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: JobKind::ClipJob,
        }
    }

    pub fn video_download(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: JobKind::VideoDownload,
        }
    }
}

/// Work the orchestrator can submit
#[derive(Debug, Clone, PartialEq)]
pub enum JobRequest {
    /// Download and clip in one job
    Unified {
        youtube_url: String,
        clips: Vec<ClipData>,
        format_id: Option<String>,
    },
    /// Clip an already downloaded video; `None` uses the latest download
    FromVideo {
        video_id: Option<String>,
        clips: Vec<ClipData>,
    },
    /// Download only
    Download {
        youtube_url: String,
        format_id: Option<String>,
    },
    /// Older combined endpoint without progress percentages
    Legacy {
        youtube_url: String,
        clips: Vec<ClipData>,
    },
}

impl JobRequest {
    pub fn clips(&self) -> &[ClipData] {
        match self {
            JobRequest::Unified { clips, .. }
            | JobRequest::FromVideo { clips, .. }
            | JobRequest::Legacy { clips, .. } => clips,
            JobRequest::Download { .. } => &[],
        }
    }

    pub fn youtube_url(&self) -> Option<&str> {
        match self {
            JobRequest::Unified { youtube_url, .. }
            | JobRequest::Download { youtube_url, .. }
            | JobRequest::Legacy { youtube_url, .. } => Some(youtube_url),
            JobRequest::FromVideo { .. } => None,
        }
    }
}

// Wire types for the processing service

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatsRequest {
    pub youtube_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatsResponse {
    #[serde(default)]
    pub formats: Vec<FormatDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadRequest {
    pub youtube_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipJobRequest {
    pub youtube_url: String,
    pub clips: Vec<ClipData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClipsRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    pub clips: Vec<ClipData>,
}

/// Acknowledgement of a download submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoAccepted {
    pub video_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

/// Acknowledgement of a clip job submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobAccepted {
    pub job_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

/// Clip file produced by a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProducedClip {
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub file_size: u64,
}

/// Response of `GET /job/{job_id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobStatusResponse {
    pub status: String,
    #[serde(default)]
    pub current_step: Option<String>,
    #[serde(default)]
    pub total_clips: u32,
    #[serde(default)]
    pub completed_clips: u32,
    #[serde(default)]
    pub clips: Vec<ProducedClip>,
    #[serde(default)]
    pub progress_percentage: Option<f64>,
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response of `GET /video/{video_id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoStatusResponse {
    pub status: String,
    #[serde(default)]
    pub current_step: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub error: Option<String>,
}

/// Entry of `GET /videos`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoSummary {
    pub video_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub youtube_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub videos: Vec<VideoSummary>,
}

/// Response of `GET /latest-video`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestVideo {
    pub filename: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewVideo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub file_size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipPreview {
    pub index: usize,
    pub title: String,
    pub start_time: String,
    pub end_time: String,
    pub duration: String,
}

/// Response of `POST /preview-clips`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub video: PreviewVideo,
    pub clips: Vec<ClipPreview>,
    pub total_clips: usize,
}

/// Client-side view of a remote job at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub job_id: String,
    pub kind: JobKind,
    pub phase: JobPhase,
    pub current_step: String,
    pub total_clips: u32,
    pub completed_clips: u32,
    pub clips: Vec<ProducedClip>,
    pub error: Option<String>,
    pub progress_percent: f64,
    /// Set when the service did not report a percentage and it was estimated
    pub progress_derived: bool,
    pub video_id: Option<String>,
    pub title: Option<String>,
    pub file_path: Option<String>,
    pub file_size: u64,
}

impl JobSnapshot {
    /// Fresh snapshot right after submission
    pub fn submitted(handle: &JobHandle, total_clips: u32) -> Self {
        Self {
            job_id: handle.id.clone(),
            kind: handle.kind,
            phase: JobPhase::Submitting,
            current_step: "Submitted".to_string(),
            total_clips,
            completed_clips: 0,
            clips: Vec::new(),
            error: None,
            progress_percent: 0.0,
            progress_derived: true,
            video_id: None,
            title: None,
            file_path: None,
            file_size: 0,
        }
    }

    /// Build from a clip job status response; phase stays `None` for unknown statuses
    pub fn from_job_status(job_id: &str, response: JobStatusResponse) -> (Self, Option<JobPhase>) {
        let phase = JobPhase::from_status(&response.status);
        let snapshot = Self {
            job_id: job_id.to_string(),
            kind: JobKind::ClipJob,
            phase: phase.unwrap_or(JobPhase::Submitting),
            current_step: response.current_step.unwrap_or_default(),
            total_clips: response.total_clips,
            completed_clips: response.completed_clips,
            clips: response.clips,
            error: response.error,
            progress_percent: response.progress_percentage.unwrap_or(0.0),
            progress_derived: response.progress_percentage.is_none(),
            video_id: response.video_id,
            title: None,
            file_path: None,
            file_size: 0,
        };
        (snapshot, phase)
    }

    /// Build from a video download status response
    pub fn from_video_status(
        video_id: &str,
        response: VideoStatusResponse,
    ) -> (Self, Option<JobPhase>) {
        let phase = JobPhase::from_status(&response.status);
        let snapshot = Self {
            job_id: video_id.to_string(),
            kind: JobKind::VideoDownload,
            phase: phase.unwrap_or(JobPhase::Submitting),
            current_step: response.current_step.unwrap_or_default(),
            total_clips: 0,
            completed_clips: 0,
            clips: Vec::new(),
            error: response.error,
            progress_percent: 0.0,
            progress_derived: true,
            video_id: Some(video_id.to_string()),
            title: response.title,
            file_path: response.file_path,
            file_size: response.file_size,
        };
        (snapshot, phase)
    }
}

#[cfg(test)]
mod tests;
