// Scripted service adapter - In-memory processing service for dry runs and tests

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;
use crate::utils::time::TimeCodec;

type Scripted<T> = Result<T, DomainError>;

/// In-memory stand-in for the processing service
///
/// Status endpoints replay a per-id script; the last entry repeats once the
/// script is exhausted. In demo mode, submissions get a generated script that
/// walks through download and per-clip processing.
pub struct ScriptedClipService {
    demo: bool,
    latency: Mutex<Duration>,
    state: Mutex<ScriptState>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

#[derive(Default)]
struct ScriptState {
    formats: HashMap<String, Vec<FormatDescriptor>>,
    default_formats: Vec<FormatDescriptor>,
    format_error: Option<DomainError>,
    submit_error: Option<DomainError>,
    queued_ids: VecDeque<String>,
    next_id: usize,
    job_scripts: HashMap<String, VecDeque<Scripted<JobStatusResponse>>>,
    video_scripts: HashMap<String, VecDeque<Scripted<VideoStatusResponse>>>,
    completed_jobs: HashSet<String>,
    videos: Vec<VideoSummary>,
    calls: Vec<String>,
    status_fetches: HashMap<String, usize>,
}

impl ScriptedClipService {
    /// Empty service; every script must be installed by the caller
    pub fn new() -> Self {
        Self {
            demo: false,
            latency: Mutex::new(Duration::ZERO),
            state: Mutex::new(ScriptState::default()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Service that answers every request with plausible generated data
    pub fn demo() -> Self {
        let service = Self {
            demo: true,
            ..Self::new()
        };
        service.state.lock().default_formats = demo_formats();
        service
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = latency;
    }

    pub fn set_formats(&self, youtube_url: &str, formats: Vec<FormatDescriptor>) {
        self.state
            .lock()
            .formats
            .insert(youtube_url.to_string(), formats);
    }

    pub fn fail_formats(&self, error: DomainError) {
        self.state.lock().format_error = Some(error);
    }

    /// The next submission fails with `error`
    pub fn fail_next_submit(&self, error: DomainError) {
        self.state.lock().submit_error = Some(error);
    }

    /// Id handed out by the next submission
    pub fn queue_job_id(&self, id: &str) {
        self.state.lock().queued_ids.push_back(id.to_string());
    }

    pub fn script_job(&self, job_id: &str, responses: Vec<Scripted<JobStatusResponse>>) {
        self.state
            .lock()
            .job_scripts
            .insert(job_id.to_string(), responses.into());
    }

    pub fn script_video(&self, video_id: &str, responses: Vec<Scripted<VideoStatusResponse>>) {
        self.state
            .lock()
            .video_scripts
            .insert(video_id.to_string(), responses.into());
    }

    /// Request log, e.g. `POST /video-formats`
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    pub fn status_fetches(&self, id: &str) -> usize {
        self.state
            .lock()
            .status_fetches
            .get(id)
            .copied()
            .unwrap_or(0)
    }

    /// Highest number of status fetches that were in flight at once
    pub fn max_concurrent_status_fetches(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, call: String) {
        self.state.lock().calls.push(call);
    }

    async fn simulate_latency(&self) {
        let latency = *self.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }

    fn next_id(&self, prefix: &str) -> String {
        let mut state = self.state.lock();
        if let Some(id) = state.queued_ids.pop_front() {
            return id;
        }
        state.next_id += 1;
        format!("{}-{}", prefix, state.next_id)
    }

    fn take_submit_error(&self) -> Option<DomainError> {
        self.state.lock().submit_error.take()
    }

    fn accept_clip_job(&self, clips: &[ClipData]) -> Result<JobAccepted, DomainError> {
        if let Some(error) = self.take_submit_error() {
            return Err(error);
        }
        if clips.is_empty() {
            return Err(DomainError::http(400, "At least one clip is required"));
        }

        let job_id = self.next_id("job");
        if self.demo {
            let script = demo_job_script(clips);
            self.state
                .lock()
                .job_scripts
                .entry(job_id.clone())
                .or_insert_with(|| script.into_iter().map(Ok).collect());
        }

        Ok(JobAccepted {
            job_id,
            status: "started".to_string(),
            message: format!("Processing {} clips", clips.len()),
        })
    }

    async fn track_status_fetch<T>(&self, id: &str, fetch: impl FnOnce() -> T) -> T {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        *self
            .state
            .lock()
            .status_fetches
            .entry(id.to_string())
            .or_insert(0) += 1;

        self.simulate_latency().await;
        let result = fetch();

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

impl Default for ScriptedClipService {
    fn default() -> Self {
        Self::new()
    }
}

/// Replay the next scripted entry, repeating the last one
fn replay<T: Clone>(script: &mut VecDeque<Scripted<T>>) -> Option<Scripted<T>> {
    if script.len() > 1 {
        script.pop_front()
    } else {
        script.front().cloned()
    }
}

#[async_trait]
impl ClipServicePort for ScriptedClipService {
    async fn health(&self) -> Result<String, DomainError> {
        self.record("GET /".to_string());
        Ok("Clip Scene API is running".to_string())
    }

    async fn discover_formats(&self, youtube_url: &str) -> Result<Vec<FormatDescriptor>, DomainError> {
        self.record("POST /video-formats".to_string());
        self.simulate_latency().await;

        let state = self.state.lock();
        if let Some(error) = &state.format_error {
            return Err(error.clone());
        }
        Ok(state
            .formats
            .get(youtube_url)
            .cloned()
            .unwrap_or_else(|| state.default_formats.clone()))
    }

    async fn download_video(&self, request: &DownloadRequest) -> Result<VideoAccepted, DomainError> {
        self.record("POST /download-video".to_string());
        self.simulate_latency().await;
        if let Some(error) = self.take_submit_error() {
            return Err(error);
        }

        let video_id = self.next_id("video");
        if self.demo {
            let script = demo_video_script(&video_id, request.format_id.as_deref());
            let mut state = self.state.lock();
            state.videos.push(VideoSummary {
                video_id: video_id.clone(),
                title: Some(format!("Demo video {}", video_id)),
                file_size: DEMO_VIDEO_SIZE,
                youtube_url: request.youtube_url.clone(),
            });
            state
                .video_scripts
                .entry(video_id.clone())
                .or_insert_with(|| script.into_iter().map(Ok).collect());
        }

        Ok(VideoAccepted {
            video_id,
            status: "started".to_string(),
            message: "Video download started".to_string(),
        })
    }

    async fn video_status(&self, video_id: &str) -> Result<VideoStatusResponse, DomainError> {
        self.record(format!("GET /video/{}", video_id));
        self.track_status_fetch(video_id, || {
            let mut state = self.state.lock();
            state
                .video_scripts
                .get_mut(video_id)
                .and_then(replay)
                .unwrap_or_else(|| Err(DomainError::http(404, "Video not found")))
        })
        .await
    }

    async fn list_videos(&self) -> Result<Vec<VideoSummary>, DomainError> {
        self.record("GET /videos".to_string());
        Ok(self.state.lock().videos.clone())
    }

    async fn latest_video(&self) -> Result<LatestVideo, DomainError> {
        self.record("GET /latest-video".to_string());
        let state = self.state.lock();
        let video = state
            .videos
            .last()
            .ok_or_else(|| DomainError::http(404, "No videos found in downloads folder"))?;
        let title = video.title.clone().unwrap_or_default();
        Ok(LatestVideo {
            filename: format!("{}_{}.mp4", video.video_id, title),
            title,
            size: video.file_size,
            path: format!("downloads/{}.mp4", video.video_id),
        })
    }

    async fn preview_clips(&self, request: &CreateClipsRequest) -> Result<PreviewResponse, DomainError> {
        self.record("POST /preview-clips".to_string());
        if request.clips.is_empty() {
            return Err(DomainError::http(400, "At least one clip is required"));
        }

        let state = self.state.lock();
        let video = match &request.video_id {
            Some(id) => state
                .videos
                .iter()
                .find(|video| &video.video_id == id)
                .ok_or_else(|| DomainError::http(404, "Video not found"))?,
            None => state
                .videos
                .last()
                .ok_or_else(|| DomainError::http(404, "No videos found in downloads folder"))?,
        };

        let clips: Vec<ClipPreview> = request
            .clips
            .iter()
            .enumerate()
            .map(|(index, clip)| ClipPreview {
                index,
                title: clip
                    .title
                    .clone()
                    .unwrap_or_else(|| format!("Clip {}", index + 1)),
                start_time: clip.start_time.clone(),
                end_time: clip.end_time.clone(),
                duration: TimeCodec::clip_duration(&clip.start_time, &clip.end_time),
            })
            .collect();

        Ok(PreviewResponse {
            video: PreviewVideo {
                title: video.title.clone(),
                file_path: Some(format!("downloads/{}.mp4", video.video_id)),
                file_size: video.file_size,
            },
            total_clips: clips.len(),
            clips,
        })
    }

    async fn create_clips_from_video(
        &self,
        request: &CreateClipsRequest,
    ) -> Result<JobAccepted, DomainError> {
        self.record("POST /create-clips-from-video".to_string());
        self.simulate_latency().await;
        self.accept_clip_job(&request.clips)
    }

    async fn submit_clip_job(&self, request: &ClipJobRequest) -> Result<JobAccepted, DomainError> {
        self.record("POST /download-and-create-clips".to_string());
        self.simulate_latency().await;
        self.accept_clip_job(&request.clips)
    }

    async fn submit_legacy_clip_job(&self, request: &ClipJobRequest) -> Result<JobAccepted, DomainError> {
        self.record("POST /create-clips".to_string());
        self.simulate_latency().await;
        self.accept_clip_job(&request.clips)
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatusResponse, DomainError> {
        self.record(format!("GET /job/{}", job_id));
        self.track_status_fetch(job_id, || {
            let mut state = self.state.lock();
            let response = state
                .job_scripts
                .get_mut(job_id)
                .and_then(replay)
                .unwrap_or_else(|| Err(DomainError::http(404, "Job not found")));
            if let Ok(status) = &response {
                if JobPhase::from_status(&status.status) == Some(JobPhase::Completed) {
                    state.completed_jobs.insert(job_id.to_string());
                }
            }
            response
        })
        .await
    }

    async fn download_archive(&self, job_id: &str) -> Result<Vec<u8>, DomainError> {
        self.record(format!("GET /download/{}", job_id));
        if !self.state.lock().completed_jobs.contains(job_id) {
            return Err(DomainError::http(400, "Job not completed yet"));
        }
        // Empty zip archive: end of central directory record only
        let mut archive = vec![0x50, 0x4b, 0x05, 0x06];
        archive.extend_from_slice(&[0u8; 18]);
        Ok(archive)
    }
}

const DEMO_VIDEO_SIZE: u64 = 48 * 1024 * 1024;

fn demo_formats() -> Vec<FormatDescriptor> {
    [
        ("401", "3840x2160", 30.0, 412.4),
        ("400", "2560x1440", 30.0, 198.7),
        ("299", "1920x1080", 60.0, 121.3),
        ("298", "1280x720", 60.0, 64.9),
    ]
    .into_iter()
    .map(|(format_id, resolution, fps, size)| FormatDescriptor {
        format_id: format_id.to_string(),
        quality_label: format!("{} ({}fps)", resolution, fps),
        resolution: resolution.to_string(),
        fps: FrameRate::Fps(fps),
        ext: "mp4".to_string(),
        filesize_mb: Some(size),
        note: "(audio will be merged automatically)".to_string(),
    })
    .collect()
}

fn demo_job_script(clips: &[ClipData]) -> Vec<JobStatusResponse> {
    let total = clips.len() as u32;
    let mut script = vec![JobStatusResponse {
        status: "downloading".to_string(),
        current_step: Some("Downloading YouTube video...".to_string()),
        total_clips: total,
        progress_percentage: Some(5.0),
        ..Default::default()
    }];

    let mut produced = Vec::new();
    for (index, clip) in clips.iter().enumerate() {
        let title = clip
            .title
            .clone()
            .unwrap_or_else(|| format!("Clip {}", index + 1));
        script.push(JobStatusResponse {
            status: "processing".to_string(),
            current_step: Some(format!(
                "Creating clip {} of {}: {}",
                index + 1,
                total,
                title
            )),
            total_clips: total,
            completed_clips: index as u32,
            clips: produced.clone(),
            progress_percentage: Some(20.0 + 80.0 * index as f64 / total as f64),
            ..Default::default()
        });
        produced.push(ProducedClip {
            index,
            title: title.clone(),
            start_time: clip.start_time.clone(),
            end_time: clip.end_time.clone(),
            file_path: format!("clips/{}_{}.mp4", index, title.replace(' ', "_")),
            file_size: 1024 * 1024,
        });
    }

    script.push(JobStatusResponse {
        status: "completed".to_string(),
        current_step: Some("All clips created successfully!".to_string()),
        total_clips: total,
        completed_clips: total,
        clips: produced,
        progress_percentage: Some(100.0),
        ..Default::default()
    });
    script
}

fn demo_video_script(video_id: &str, format_id: Option<&str>) -> Vec<VideoStatusResponse> {
    let step = match format_id {
        Some(format_id) => format!("Downloading YouTube video (format: {})...", format_id),
        None => "Downloading YouTube video (auto quality)...".to_string(),
    };
    vec![
        VideoStatusResponse {
            status: "downloading".to_string(),
            current_step: Some(step),
            ..Default::default()
        },
        VideoStatusResponse {
            status: "completed".to_string(),
            current_step: Some("Download completed!".to_string()),
            title: Some(format!("Demo video {}", video_id)),
            file_path: Some(format!("downloads/{}.mp4", video_id)),
            file_size: DEMO_VIDEO_SIZE,
            error: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(title: &str) -> ClipData {
        ClipData {
            title: Some(title.to_string()),
            start_time: "00:00:10".to_string(),
            end_time: "00:00:20".to_string(),
        }
    }

    #[tokio::test]
    async fn test_replays_script_and_repeats_last() {
        let service = ScriptedClipService::new();
        service.script_job(
            "j",
            vec![
                Ok(JobStatusResponse {
                    status: "downloading".to_string(),
                    ..Default::default()
                }),
                Ok(JobStatusResponse {
                    status: "completed".to_string(),
                    ..Default::default()
                }),
            ],
        );
        assert_eq!(service.job_status("j").await.unwrap().status, "downloading");
        assert_eq!(service.job_status("j").await.unwrap().status, "completed");
        assert_eq!(service.job_status("j").await.unwrap().status, "completed");
        assert_eq!(service.status_fetches("j"), 3);
        assert!(service.job_status("missing").await.is_err());
    }

    #[tokio::test]
    async fn test_demo_job_walks_to_completion() {
        let service = ScriptedClipService::demo();
        let accepted = service
            .submit_clip_job(&ClipJobRequest {
                youtube_url: "https://youtu.be/x".to_string(),
                clips: vec![clip("a"), clip("b")],
                format_id: None,
            })
            .await
            .unwrap();

        assert!(service.download_archive(&accepted.job_id).await.is_err());
        let mut last = JobStatusResponse::default();
        for _ in 0..4 {
            last = service.job_status(&accepted.job_id).await.unwrap();
        }
        assert_eq!(last.status, "completed");
        assert_eq!(last.completed_clips, 2);
        assert_eq!(last.clips.len(), 2);
        assert!(service.download_archive(&accepted.job_id).await.is_ok());
    }

    #[tokio::test]
    async fn test_preview_uses_latest_download() {
        let service = ScriptedClipService::demo();
        assert!(service.latest_video().await.is_err());
        service
            .download_video(&DownloadRequest {
                youtube_url: "https://youtu.be/x".to_string(),
                format_id: Some("299".to_string()),
            })
            .await
            .unwrap();

        let preview = service
            .preview_clips(&CreateClipsRequest {
                video_id: None,
                clips: vec![clip("a")],
            })
            .await
            .unwrap();
        assert_eq!(preview.total_clips, 1);
        assert_eq!(preview.clips[0].duration, "00:00:10");
    }

    #[tokio::test]
    async fn test_queued_id_and_submit_failure() {
        let service = ScriptedClipService::new();
        service.fail_next_submit(DomainError::http(500, "boom"));
        let request = CreateClipsRequest {
            video_id: Some("v".to_string()),
            clips: vec![clip("a")],
        };
        assert!(service.create_clips_from_video(&request).await.is_err());

        service.queue_job_id("abc");
        let accepted = service.create_clips_from_video(&request).await.unwrap();
        assert_eq!(accepted.job_id, "abc");
    }
}
