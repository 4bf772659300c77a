// Simulated player adapter - Clock-driven media player without decoding

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::trace;

use crate::ports::PlayerPort;

/// Player that advances its position with the tokio clock
///
/// Used by the interactive editor and by tests running on paused time.
pub struct SimulatedPlayer {
    duration: f64,
    clock: Mutex<PlayerClock>,
}

#[derive(Debug)]
struct PlayerClock {
    position: f64,
    playing_since: Option<Instant>,
    volume: f32,
}

impl SimulatedPlayer {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            clock: Mutex::new(PlayerClock {
                position: 0.0,
                playing_since: None,
                volume: 1.0,
            }),
        }
    }

    pub fn volume(&self) -> f32 {
        self.clock.lock().volume
    }

    fn position(&self, clock: &PlayerClock) -> f64 {
        let elapsed = clock
            .playing_since
            .map(|since| since.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        (clock.position + elapsed).min(self.duration)
    }
}

impl PlayerPort for SimulatedPlayer {
    fn play(&self) {
        let mut clock = self.clock.lock();
        if clock.playing_since.is_none() {
            clock.playing_since = Some(Instant::now());
        }
    }

    fn pause(&self) {
        let mut clock = self.clock.lock();
        clock.position = self.position(&clock);
        clock.playing_since = None;
    }

    fn seek(&self, seconds: f64) {
        let mut clock = self.clock.lock();
        clock.position = seconds.clamp(0.0, self.duration);
        if clock.playing_since.is_some() {
            clock.playing_since = Some(Instant::now());
        }
        trace!(position = clock.position, "Seek");
    }

    fn duration(&self) -> Option<f64> {
        Some(self.duration)
    }

    fn current_time(&self) -> f64 {
        let clock = self.clock.lock();
        self.position(&clock)
    }

    fn is_playing(&self) -> bool {
        let clock = self.clock.lock();
        clock.playing_since.is_some() && self.position(&clock) < self.duration
    }

    fn set_volume(&self, volume: f32) {
        self.clock.lock().volume = volume;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_position_follows_clock() {
        let player = SimulatedPlayer::new(10.0);
        player.seek(2.0);
        player.play();
        tokio::time::advance(Duration::from_secs(3)).await;
        assert!((player.current_time() - 5.0).abs() < 1e-6);

        player.pause();
        tokio::time::advance(Duration::from_secs(3)).await;
        assert!((player.current_time() - 5.0).abs() < 1e-6);
        assert!(!player.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_at_end_of_media() {
        let player = SimulatedPlayer::new(4.0);
        player.play();
        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(player.current_time(), 4.0);
        assert!(!player.is_playing());
    }
}
