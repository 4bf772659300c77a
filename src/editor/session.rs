//! Editor session: scrubber, committed clips and the selected clip
//!
//! Stored clips and the live range are synchronized in one direction only,
//! through explicit transitions: selecting a different clip seeds the range
//! from that clip's stored times. Drags never write back into a clip unless
//! the user asks for it with [`EditorSession::apply_range_to_selected`].

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::domain::errors::DomainError;
use crate::domain::model::{Clip, ClipData, ClipField, ClipId};
use crate::editor::clips::ClipSet;
use crate::editor::scrubber::Scrubber;
use crate::ports::PlayerPort;
use crate::utils::time::TimeCodec;

pub struct EditorSession {
    scrubber: Scrubber,
    clips: ClipSet,
    selected: Option<ClipId>,
}

impl EditorSession {
    pub fn new(player: Arc<dyn PlayerPort>, sample_period: Duration) -> Result<Self, DomainError> {
        Ok(Self {
            scrubber: Scrubber::new(player, sample_period)?,
            clips: ClipSet::new(),
            selected: None,
        })
    }

    pub fn scrubber(&self) -> &Scrubber {
        &self.scrubber
    }

    pub fn scrubber_mut(&mut self) -> &mut Scrubber {
        &mut self.scrubber
    }

    pub fn clips(&self) -> &ClipSet {
        &self.clips
    }

    pub fn selected(&self) -> Option<ClipId> {
        self.selected
    }

    pub fn selected_clip(&self) -> Option<&Clip> {
        self.selected.and_then(|id| self.clips.get(id))
    }

    /// Commit the current range as a new clip
    pub fn commit_range(&mut self, title: Option<&str>) -> ClipId {
        let range = self.scrubber.range();
        let id = self.clips.add(title, range);
        info!(clip = %id, start = range.start_seconds, end = range.end_seconds, "Clip added");
        id
    }

    /// Change the selected clip
    ///
    /// Seeding happens only when the identity changes; reselecting the same
    /// clip leaves the live range alone.
    pub fn select_clip(&mut self, id: Option<ClipId>) -> Result<(), DomainError> {
        if id == self.selected {
            return Ok(());
        }
        if let Some(id) = id {
            if self.clips.get(id).is_none() {
                return Err(DomainError::NotFound(format!("clip {}", id)));
            }
        }

        self.selected = id;
        match id {
            Some(id) => {
                self.seed_from_clip(id);
                debug!(clip = %id, "Selected clip");
            }
            None => self.scrubber.pause(),
        }
        Ok(())
    }

    /// Edit a stored clip; editing the selected clip's times moves the range
    pub fn update_clip_field(
        &mut self,
        id: ClipId,
        field: ClipField,
        value: &str,
    ) -> Result<(), DomainError> {
        self.clips.update_field(id, field, value)?;
        if field.is_time() && self.selected == Some(id) {
            self.seed_from_clip(id);
        }
        Ok(())
    }

    /// Store the live range into the selected clip
    pub fn apply_range_to_selected(&mut self) -> Result<(), DomainError> {
        let id = self
            .selected
            .ok_or_else(|| DomainError::Validation("No clip is selected".to_string()))?;
        self.clips.set_times(id, self.scrubber.range())
    }

    pub fn remove_clip(&mut self, id: ClipId) -> Result<Clip, DomainError> {
        let clip = self
            .clips
            .remove(id)
            .ok_or_else(|| DomainError::NotFound(format!("clip {}", id)))?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        Ok(clip)
    }

    /// Submission payload
    pub fn clip_data(&self) -> Vec<ClipData> {
        self.clips.to_clip_data()
    }

    fn seed_from_clip(&mut self, id: ClipId) {
        if let Some(clip) = self.clips.get(id) {
            let start = TimeCodec::parse_timecode(&clip.start_time) as f64;
            let end = TimeCodec::parse_timecode(&clip.end_time) as f64;
            self.scrubber.seed(start, end);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sim_player::SimulatedPlayer;
    use crate::domain::model::TimeRange;
    use crate::editor::scrubber::{DragTarget, DEFAULT_SAMPLE_PERIOD};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn session() -> EditorSession {
        let player = Arc::new(SimulatedPlayer::new(200.0));
        EditorSession::new(player, DEFAULT_SAMPLE_PERIOD).unwrap()
    }

    /// Simulated player that counts position reads
    struct CountingPlayer {
        inner: SimulatedPlayer,
        reads: AtomicUsize,
    }

    impl PlayerPort for CountingPlayer {
        fn play(&self) {
            self.inner.play()
        }
        fn pause(&self) {
            self.inner.pause()
        }
        fn seek(&self, seconds: f64) {
            self.inner.seek(seconds)
        }
        fn duration(&self) -> Option<f64> {
            self.inner.duration()
        }
        fn current_time(&self) -> f64 {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.current_time()
        }
        fn is_playing(&self) -> bool {
            self.inner.is_playing()
        }
        fn set_volume(&self, volume: f32) {
            self.inner.set_volume(volume)
        }
    }

    fn drag(session: &mut EditorSession, target: DragTarget, fraction: f64) {
        let scrubber = session.scrubber_mut();
        scrubber.begin_drag(target);
        scrubber.update_drag(fraction);
        scrubber.end_drag();
    }

    #[tokio::test]
    async fn test_select_seeds_range_once() {
        let mut session = session();
        drag(&mut session, DragTarget::Start, 0.1);
        drag(&mut session, DragTarget::End, 0.2);
        let a = session.commit_range(Some("A"));

        drag(&mut session, DragTarget::End, 0.5);
        drag(&mut session, DragTarget::Start, 0.3);
        let b = session.commit_range(Some("B"));

        session.select_clip(Some(a)).unwrap();
        assert_eq!(session.scrubber().range(), TimeRange::new(20.0, 40.0));

        session.select_clip(Some(b)).unwrap();
        assert_eq!(session.scrubber().range(), TimeRange::new(60.0, 100.0));

        // Dragging after selection does not touch either stored clip
        drag(&mut session, DragTarget::End, 0.9);
        assert_eq!(session.scrubber().range().end_seconds, 180.0);
        assert_eq!(session.clips().get(a).unwrap().end_time, "00:00:40");
        assert_eq!(session.clips().get(b).unwrap().end_time, "00:01:40");

        // Reselecting the same clip does not re-seed
        session.select_clip(Some(b)).unwrap();
        assert_eq!(session.scrubber().range().end_seconds, 180.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_switching_clips_stops_sampling() {
        let player = Arc::new(CountingPlayer {
            inner: SimulatedPlayer::new(200.0),
            reads: AtomicUsize::new(0),
        });
        let mut session =
            EditorSession::new(player.clone() as Arc<dyn PlayerPort>, DEFAULT_SAMPLE_PERIOD)
                .unwrap();
        drag(&mut session, DragTarget::End, 0.5);
        let a = session.commit_range(Some("A"));

        session.scrubber_mut().play();
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(session.scrubber().is_sampling());

        session.select_clip(Some(a)).unwrap();
        assert!(!session.scrubber().is_sampling());
        assert!(!player.is_playing());

        let reads = player.reads.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(player.reads.load(Ordering::SeqCst), reads);
    }

    #[tokio::test]
    async fn test_editing_unselected_clip_leaves_range() {
        let mut session = session();
        let a = session.commit_range(None);
        let b = session.commit_range(None);
        session.select_clip(Some(a)).unwrap();
        let before = session.scrubber().range();

        session
            .update_clip_field(b, ClipField::StartTime, "00:00:30")
            .unwrap();
        assert_eq!(session.scrubber().range(), before);

        session
            .update_clip_field(a, ClipField::StartTime, "00:00:30")
            .unwrap();
        assert_eq!(session.scrubber().range().start_seconds, 30.0);
    }

    #[tokio::test]
    async fn test_apply_range_to_selected() {
        let mut session = session();
        assert!(session.apply_range_to_selected().is_err());

        let a = session.commit_range(None);
        session.select_clip(Some(a)).unwrap();
        drag(&mut session, DragTarget::Start, 0.25);
        session.apply_range_to_selected().unwrap();
        assert_eq!(session.selected_clip().unwrap().start_time, "00:00:50");
    }

    #[tokio::test]
    async fn test_remove_selected_clears_selection() {
        let mut session = session();
        let a = session.commit_range(None);
        session.select_clip(Some(a)).unwrap();
        session.remove_clip(a).unwrap();
        assert_eq!(session.selected(), None);
        assert!(session.remove_clip(a).is_err());
        assert!(session.select_clip(Some(a)).is_err());
    }

    #[tokio::test]
    async fn test_malformed_stored_times_seed_leniently() {
        let mut session = session();
        let a = session.commit_range(None);
        session
            .update_clip_field(a, ClipField::EndTime, "oops")
            .unwrap();
        session.select_clip(Some(a)).unwrap();
        let range = session.scrubber().range();
        assert_eq!(range, TimeRange::new(0.0, 1.0));
    }
}
