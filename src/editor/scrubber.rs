//! Dual-handle scrubber bound to the media player
//!
//! The scrubber is the only component that issues player commands. Pointer
//! positions arrive as fractions of the track width and are mapped onto the
//! [`RangeModel`]; while playback runs, a sampling task mirrors the player's
//! position into the displayed cursor and stops playback at the out-point.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace};

use crate::domain::errors::DomainError;
use crate::domain::model::TimeRange;
use crate::editor::range::RangeModel;
use crate::ports::PlayerPort;

/// Default period of the playback sampling loop
pub const DEFAULT_SAMPLE_PERIOD: Duration = Duration::from_millis(100);

/// What the pointer is currently dragging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    Start,
    End,
    Seek,
}

impl DragTarget {
    /// Parse drag target from user input
    pub fn parse(target: &str) -> Result<Self, DomainError> {
        match target.to_lowercase().as_str() {
            "start" | "in" => Ok(DragTarget::Start),
            "end" | "out" => Ok(DragTarget::End),
            "seek" | "playhead" => Ok(DragTarget::Seek),
            _ => Err(DomainError::Validation(format!(
                "Invalid drag target: {}. Valid targets: start, end, seek",
                target
            ))),
        }
    }
}

/// Values the sampling task needs from the scrubber
#[derive(Debug, Clone, Copy, PartialEq)]
struct PlaybackBounds {
    end_seconds: f64,
    dragging: bool,
}

/// Scoped handle of the sampling task; aborted when dropped
struct PlaybackSampler {
    handle: JoinHandle<()>,
}

impl PlaybackSampler {
    fn spawn(
        player: Arc<dyn PlayerPort>,
        bounds: watch::Receiver<PlaybackBounds>,
        cursor: Arc<watch::Sender<f64>>,
        period: Duration,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let current = player.current_time();
                let PlaybackBounds {
                    end_seconds,
                    dragging,
                } = *bounds.borrow();

                if !dragging {
                    cursor.send_replace(current);
                }
                if current >= end_seconds {
                    debug!(current, end_seconds, "Reached out-point, pausing playback");
                    player.pause();
                    break;
                }
            }
        });
        Self { handle }
    }

    fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for PlaybackSampler {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Range editor bound to a player
pub struct Scrubber {
    range: RangeModel,
    player: Arc<dyn PlayerPort>,
    drag_target: Option<DragTarget>,
    sample_period: Duration,
    bounds: watch::Sender<PlaybackBounds>,
    cursor: Arc<watch::Sender<f64>>,
    sampler: Option<PlaybackSampler>,
}

impl Scrubber {
    /// Bind to a player whose metadata (duration) is already loaded
    pub fn new(player: Arc<dyn PlayerPort>, sample_period: Duration) -> Result<Self, DomainError> {
        if sample_period.is_zero() {
            return Err(DomainError::Validation(
                "Sample period must be greater than zero".to_string(),
            ));
        }
        let duration = player.duration().ok_or_else(|| {
            DomainError::Validation("Media duration is not known yet".to_string())
        })?;
        let range = RangeModel::new(duration)?;
        let (bounds, _) = watch::channel(PlaybackBounds {
            end_seconds: range.end(),
            dragging: false,
        });
        let (cursor, _) = watch::channel(player.current_time());

        Ok(Self {
            range,
            player,
            drag_target: None,
            sample_period,
            bounds,
            cursor: Arc::new(cursor),
            sampler: None,
        })
    }

    pub fn range(&self) -> TimeRange {
        self.range.range()
    }

    pub fn duration(&self) -> f64 {
        self.range.duration()
    }

    pub fn drag_target(&self) -> Option<DragTarget> {
        self.drag_target
    }

    /// Displayed playback position
    pub fn cursor(&self) -> f64 {
        *self.cursor.borrow()
    }

    /// Whether the sampling loop is currently alive
    pub fn is_sampling(&self) -> bool {
        self.sampler.as_ref().is_some_and(PlaybackSampler::is_running)
    }

    pub fn begin_drag(&mut self, target: DragTarget) {
        self.drag_target = Some(target);
        self.publish_bounds();
    }

    /// Apply a pointer position, normalized to `[0, 1]` of the track
    pub fn update_drag(&mut self, fraction: f64) {
        let Some(target) = self.drag_target else {
            return;
        };
        let candidate = self.range.fraction_to_seconds(fraction);

        match target {
            DragTarget::Start => {
                let start = self.range.set_start(candidate);
                self.seek_player(start);
            }
            DragTarget::End => {
                self.range.set_end(candidate);
            }
            DragTarget::Seek => {
                self.seek_player(candidate);
            }
        }
        trace!(?target, start = self.range.start(), end = self.range.end(), "Drag update");
        self.publish_bounds();
    }

    /// Release the pointer; playback position is left where it is
    pub fn end_drag(&mut self) {
        self.drag_target = None;
        self.publish_bounds();
    }

    /// Click on the track outside of a drag: immediate seek
    pub fn click_track(&mut self, fraction: f64) {
        if self.drag_target.is_some() {
            return;
        }
        let seconds = self.range.fraction_to_seconds(fraction);
        self.seek_player(seconds);
    }

    /// Replace the range, e.g. when a stored clip is selected
    ///
    /// Playback is paused and the player moved to the new in-point.
    pub fn seed(&mut self, start: f64, end: f64) {
        self.pause();
        self.drag_target = None;
        self.range.seed(start, end);
        self.seek_player(self.range.start());
        self.publish_bounds();
    }

    /// User gesture: start playback inside the selected range
    pub fn play(&mut self) {
        let current = self.player.current_time();
        if current < self.range.start() || current >= self.range.end() {
            self.seek_player(self.range.start());
        }
        self.player.play();
        self.on_play();
    }

    /// User gesture: stop playback
    pub fn pause(&mut self) {
        if self.player.is_playing() {
            self.player.pause();
        }
        self.on_pause();
    }

    /// Player event: playback started
    pub fn on_play(&mut self) {
        // Replacing the handle aborts any previous loop
        self.sampler = Some(PlaybackSampler::spawn(
            Arc::clone(&self.player),
            self.bounds.subscribe(),
            Arc::clone(&self.cursor),
            self.sample_period,
        ));
    }

    /// Player event: playback stopped
    pub fn on_pause(&mut self) {
        self.sampler = None;
        self.cursor.send_replace(self.player.current_time());
    }

    pub fn set_volume(&self, volume: f32) {
        self.player.set_volume(volume.clamp(0.0, 1.0));
    }

    fn seek_player(&self, seconds: f64) {
        self.player.seek(seconds);
        self.cursor.send_replace(seconds);
    }

    fn publish_bounds(&self) {
        self.bounds.send_replace(PlaybackBounds {
            end_seconds: self.range.end(),
            dragging: self.drag_target.is_some(),
        });
    }
}
