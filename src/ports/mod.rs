// Ports - Interface definitions (contracts)

use crate::domain::errors::*;
use crate::domain::model::*;
use async_trait::async_trait;

/// Port for the remote clip processing service
#[async_trait]
pub trait ClipServicePort: Send + Sync {
    /// Check that the service is reachable
    async fn health(&self) -> Result<String, DomainError>;

    /// Discover downloadable encodings for a source URL
    async fn discover_formats(&self, youtube_url: &str) -> Result<Vec<FormatDescriptor>, DomainError>;

    /// Start a download-only job
    async fn download_video(&self, request: &DownloadRequest) -> Result<VideoAccepted, DomainError>;

    /// Fetch the status of a download job
    async fn video_status(&self, video_id: &str) -> Result<VideoStatusResponse, DomainError>;

    /// List completed downloads
    async fn list_videos(&self) -> Result<Vec<VideoSummary>, DomainError>;

    /// Most recent file in the service's download folder
    async fn latest_video(&self) -> Result<LatestVideo, DomainError>;

    /// Describe the clips a job would produce without running it
    async fn preview_clips(&self, request: &CreateClipsRequest) -> Result<PreviewResponse, DomainError>;

    /// Clip an already downloaded video
    async fn create_clips_from_video(
        &self,
        request: &CreateClipsRequest,
    ) -> Result<JobAccepted, DomainError>;

    /// Download and clip in one job
    async fn submit_clip_job(&self, request: &ClipJobRequest) -> Result<JobAccepted, DomainError>;

    /// Older combined endpoint
    async fn submit_legacy_clip_job(&self, request: &ClipJobRequest) -> Result<JobAccepted, DomainError>;

    /// Fetch the status of a clip job
    async fn job_status(&self, job_id: &str) -> Result<JobStatusResponse, DomainError>;

    /// Download the zip archive of a completed job
    async fn download_archive(&self, job_id: &str) -> Result<Vec<u8>, DomainError>;
}

/// Port for the media player widget
///
/// Implementations are driven only by the scrubber. Events (`play`/`pause`
/// emitted by the player itself) are delivered back through
/// `Scrubber::on_play` / `Scrubber::on_pause`.
pub trait PlayerPort: Send + Sync {
    fn play(&self);

    fn pause(&self);

    /// Jump to an absolute position in seconds
    fn seek(&self, seconds: f64);

    /// Media duration once metadata is loaded
    fn duration(&self) -> Option<f64>;

    fn current_time(&self) -> f64;

    fn is_playing(&self) -> bool;

    /// Volume in `[0, 1]`
    fn set_volume(&self, volume: f32);
}
