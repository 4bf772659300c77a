// Job orchestrator - Submits processing jobs and follows them to a terminal phase

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::*;

/// Default delay between two status fetches
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// What the orchestrator currently knows about the job it follows
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorState {
    pub phase: JobPhase,
    pub job: Option<JobHandle>,
    pub snapshot: Option<JobSnapshot>,
}

impl OrchestratorState {
    fn idle() -> Self {
        Self {
            phase: JobPhase::Idle,
            job: None,
            snapshot: None,
        }
    }

    fn follows(&self, handle: &JobHandle) -> bool {
        self.job.as_ref() == Some(handle)
    }
}

type ActivePolls = Arc<Mutex<HashMap<String, Arc<AtomicBool>>>>;

/// Registration of a polling loop; removed from the map when dropped
struct PollRegistration {
    active: ActivePolls,
    job_id: String,
    cancelled: Arc<AtomicBool>,
}

impl PollRegistration {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for PollRegistration {
    fn drop(&mut self) {
        self.active.lock().remove(&self.job_id);
    }
}

/// Orchestrator for remote clip and download jobs
pub struct JobOrchestrator {
    service: Arc<dyn ClipServicePort>,
    poll_interval: Duration,
    state: watch::Sender<OrchestratorState>,
    active: ActivePolls,
}

impl JobOrchestrator {
    /// Create new orchestrator with injected service port
    pub fn new(service: Arc<dyn ClipServicePort>, poll_interval: Duration) -> Result<Self, DomainError> {
        if poll_interval.is_zero() {
            return Err(DomainError::Validation(
                "Poll interval must be greater than zero".to_string(),
            ));
        }
        let (state, _) = watch::channel(OrchestratorState::idle());
        Ok(Self {
            service,
            poll_interval,
            state,
            active: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn state(&self) -> OrchestratorState {
        self.state.borrow().clone()
    }

    pub fn phase(&self) -> JobPhase {
        self.state.borrow().phase
    }

    pub fn subscribe(&self) -> watch::Receiver<OrchestratorState> {
        self.state.subscribe()
    }

    /// Validate and submit a job
    ///
    /// On failure the state is restored to what it was before the call.
    pub async fn submit(&self, request: JobRequest) -> Result<JobHandle, DomainError> {
        if let Err(error) = SubmissionValidator::validate_request(&request) {
            warn!(error = %error, "Submission rejected");
            return Err(error);
        }

        let previous = self.state.send_replace(OrchestratorState {
            phase: JobPhase::Submitting,
            job: None,
            snapshot: None,
        });

        let result = match &request {
            JobRequest::Unified {
                youtube_url,
                clips,
                format_id,
            } => self
                .service
                .submit_clip_job(&ClipJobRequest {
                    youtube_url: youtube_url.clone(),
                    clips: clips.clone(),
                    format_id: format_id.clone(),
                })
                .await
                .map(|accepted| JobHandle::clip_job(accepted.job_id)),
            JobRequest::FromVideo { video_id, clips } => self
                .service
                .create_clips_from_video(&CreateClipsRequest {
                    video_id: video_id.clone(),
                    clips: clips.clone(),
                })
                .await
                .map(|accepted| JobHandle::clip_job(accepted.job_id)),
            JobRequest::Download {
                youtube_url,
                format_id,
            } => self
                .service
                .download_video(&DownloadRequest {
                    youtube_url: youtube_url.clone(),
                    format_id: format_id.clone(),
                })
                .await
                .map(|accepted| JobHandle::video_download(accepted.video_id)),
            JobRequest::Legacy { youtube_url, clips } => self
                .service
                .submit_legacy_clip_job(&ClipJobRequest {
                    youtube_url: youtube_url.clone(),
                    clips: clips.clone(),
                    format_id: None,
                })
                .await
                .map(|accepted| JobHandle::clip_job(accepted.job_id)),
        };

        match result {
            Ok(handle) => {
                let total_clips = request.clips().len() as u32;
                info!(job_id = %handle.id, kind = ?handle.kind, total_clips, "Job submitted");
                self.state.send_replace(OrchestratorState {
                    phase: JobPhase::Submitting,
                    job: Some(handle.clone()),
                    snapshot: Some(JobSnapshot::submitted(&handle, total_clips)),
                });
                Ok(handle)
            }
            Err(error) => {
                warn!(error = %error, "Job submission failed");
                self.state.send_replace(previous);
                Err(error)
            }
        }
    }

    /// Poll a job every `poll_interval` until it completes or fails
    ///
    /// Fetches never overlap. Each normalized snapshot is handed to
    /// `on_snapshot` before the phase is checked.
    pub async fn poll_until_terminal<F>(
        &self,
        handle: &JobHandle,
        mut on_snapshot: F,
    ) -> Result<JobSnapshot, DomainError>
    where
        F: FnMut(&JobSnapshot) + Send,
    {
        let registration = self.register(&handle.id)?;
        self.attach(handle);

        let mut last = self
            .state
            .borrow()
            .snapshot
            .clone()
            .filter(|snapshot| snapshot.job_id == handle.id)
            .unwrap_or_else(|| JobSnapshot::submitted(handle, 0));

        let mut ticker =
            tokio::time::interval_at(Instant::now() + self.poll_interval, self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if registration.is_cancelled() {
                info!(job_id = %handle.id, "Polling cancelled");
                return Err(DomainError::Cancelled(handle.id.clone()));
            }

            let fetched = self.fetch_raw(handle).await;
            if registration.is_cancelled() {
                debug!(job_id = %handle.id, "Discarded status received after cancellation");
                return Err(DomainError::Cancelled(handle.id.clone()));
            }

            let (snapshot, reported) = match fetched {
                Ok(fetched) => fetched,
                Err(error) => {
                    warn!(job_id = %handle.id, error = %error, "Status fetch failed");
                    return Err(error);
                }
            };

            let snapshot = normalize(&last, snapshot, reported);
            debug!(
                job_id = %handle.id,
                phase = %snapshot.phase,
                completed = snapshot.completed_clips,
                total = snapshot.total_clips,
                "Status update"
            );
            self.publish(handle, &snapshot);
            on_snapshot(&snapshot);

            match snapshot.phase {
                JobPhase::Completed => {
                    info!(job_id = %handle.id, clips = snapshot.clips.len(), "Job completed");
                    return Ok(snapshot);
                }
                JobPhase::Error => {
                    let message = snapshot
                        .error
                        .clone()
                        .unwrap_or_else(|| "Processing failed".to_string());
                    warn!(job_id = %handle.id, error = %message, "Job failed");
                    return Err(DomainError::RemoteJob(message));
                }
                _ => last = snapshot,
            }
        }
    }

    /// Stop the polling loop for `job_id` at its next tick
    pub fn cancel(&self, job_id: &str) -> bool {
        match self.active.lock().get(job_id) {
            Some(flag) => {
                flag.store(true, Ordering::SeqCst);
                true
            }
            None => false,
        }
    }

    pub fn is_polling(&self, job_id: &str) -> bool {
        self.active.lock().contains_key(job_id)
    }

    /// Single status read, normalized but not recorded
    pub async fn fetch_snapshot(&self, handle: &JobHandle) -> Result<JobSnapshot, DomainError> {
        let (snapshot, reported) = self.fetch_raw(handle).await?;
        let base = JobSnapshot::submitted(handle, snapshot.total_clips);
        Ok(normalize(&base, snapshot, reported))
    }

    /// Zip archive of a completed clip job
    pub async fn fetch_archive(&self, job_id: &str) -> Result<Vec<u8>, DomainError> {
        {
            let state = self.state.borrow();
            let known = state.job.as_ref().is_some_and(|job| job.id == job_id);
            if known && state.phase != JobPhase::Completed {
                return Err(DomainError::Validation(format!(
                    "Job {} is not completed yet",
                    job_id
                )));
            }
        }
        let archive = self.service.download_archive(job_id).await?;
        info!(job_id, bytes = archive.len(), "Archive downloaded");
        Ok(archive)
    }

    pub async fn list_videos(&self) -> Result<Vec<VideoSummary>, DomainError> {
        self.service.list_videos().await
    }

    pub async fn latest_video(&self) -> Result<LatestVideo, DomainError> {
        self.service.latest_video().await
    }

    /// Describe the clips a from-video job would produce
    pub async fn preview_clips(
        &self,
        video_id: Option<String>,
        clips: Vec<ClipData>,
    ) -> Result<PreviewResponse, DomainError> {
        SubmissionValidator::validate_clips(&clips)?;
        self.service
            .preview_clips(&CreateClipsRequest { video_id, clips })
            .await
    }

    pub async fn health(&self) -> Result<String, DomainError> {
        self.service.health().await
    }

    fn register(&self, job_id: &str) -> Result<PollRegistration, DomainError> {
        let mut active = self.active.lock();
        if active.contains_key(job_id) {
            return Err(DomainError::PollInProgress(job_id.to_string()));
        }
        let cancelled = Arc::new(AtomicBool::new(false));
        active.insert(job_id.to_string(), Arc::clone(&cancelled));
        Ok(PollRegistration {
            active: Arc::clone(&self.active),
            job_id: job_id.to_string(),
            cancelled,
        })
    }

    /// Follow `handle` if the orchestrator is not already following it
    fn attach(&self, handle: &JobHandle) {
        self.state.send_if_modified(|state| {
            if state.follows(handle) {
                return false;
            }
            *state = OrchestratorState {
                phase: JobPhase::Submitting,
                job: Some(handle.clone()),
                snapshot: None,
            };
            true
        });
    }

    fn publish(&self, handle: &JobHandle, snapshot: &JobSnapshot) {
        self.state.send_if_modified(|state| {
            if !state.follows(handle) {
                return false;
            }
            state.phase = snapshot.phase;
            state.snapshot = Some(snapshot.clone());
            true
        });
    }

    async fn fetch_raw(
        &self,
        handle: &JobHandle,
    ) -> Result<(JobSnapshot, Option<JobPhase>), DomainError> {
        match handle.kind {
            JobKind::ClipJob => {
                let response = self.service.job_status(&handle.id).await?;
                Ok(JobSnapshot::from_job_status(&handle.id, response))
            }
            JobKind::VideoDownload => {
                let response = self.service.video_status(&handle.id).await?;
                Ok(JobSnapshot::from_video_status(&handle.id, response))
            }
        }
    }
}

/// Merge a fetched snapshot into the previous one
///
/// The phase only moves forward and completed clips never decrease. When the
/// service omits a percentage it is estimated from the phase.
fn normalize(
    previous: &JobSnapshot,
    mut snapshot: JobSnapshot,
    reported: Option<JobPhase>,
) -> JobSnapshot {
    snapshot.phase = match reported {
        Some(phase) if previous.phase.can_transition_to(phase) => phase,
        Some(phase) => {
            if phase != previous.phase {
                debug!(from = %previous.phase, to = %phase, "Ignored backward phase transition");
            }
            previous.phase
        }
        None => previous.phase,
    };

    snapshot.completed_clips = snapshot.completed_clips.max(previous.completed_clips);
    if snapshot.total_clips == 0 {
        snapshot.total_clips = previous.total_clips;
    }

    if snapshot.progress_derived {
        snapshot.progress_percent = ProgressEstimator::estimate(
            snapshot.phase,
            snapshot.completed_clips,
            snapshot.total_clips,
        );
    }
    snapshot
}
