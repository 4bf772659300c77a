//! Two-handle range held by the editor

use crate::domain::errors::DomainError;
use crate::domain::model::TimeRange;

/// Minimum distance kept between the in-point and the out-point
pub const MIN_SEPARATION: f64 = 1.0;

/// Live `{start, end}` selection bound to a media duration
///
/// Every mutation keeps `0 <= start < end <= duration` with at least
/// [`MIN_SEPARATION`] seconds between the handles.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeModel {
    start_seconds: f64,
    end_seconds: f64,
    duration: f64,
}

impl RangeModel {
    /// Create a range covering the whole media
    pub fn new(duration: f64) -> Result<Self, DomainError> {
        Self::check_duration(duration)?;
        Ok(Self {
            start_seconds: 0.0,
            end_seconds: duration,
            duration,
        })
    }

    fn check_duration(duration: f64) -> Result<(), DomainError> {
        if !duration.is_finite() || duration < MIN_SEPARATION {
            return Err(DomainError::Validation(format!(
                "Media duration must be at least {} second(s), got {}",
                MIN_SEPARATION, duration
            )));
        }
        Ok(())
    }

    pub fn start(&self) -> f64 {
        self.start_seconds
    }

    pub fn end(&self) -> f64 {
        self.end_seconds
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start_seconds, self.end_seconds)
    }

    /// Move the in-point; returns the value actually applied
    pub fn set_start(&mut self, candidate: f64) -> f64 {
        let upper = self.end_seconds - MIN_SEPARATION;
        self.start_seconds = sanitize(candidate).min(upper).max(0.0);
        self.start_seconds
    }

    /// Move the out-point; returns the value actually applied
    pub fn set_end(&mut self, candidate: f64) -> f64 {
        let lower = self.start_seconds + MIN_SEPARATION;
        self.end_seconds = sanitize(candidate).max(lower).min(self.duration);
        self.end_seconds
    }

    /// Replace both handles at once, e.g. from a stored clip
    pub fn seed(&mut self, start: f64, end: f64) {
        let start = sanitize(start).clamp(0.0, self.duration - MIN_SEPARATION);
        let end = sanitize(end).clamp(start + MIN_SEPARATION, self.duration);
        self.start_seconds = start;
        self.end_seconds = end;
    }

    /// Rebind to a new media duration, clamping the handles into it
    pub fn set_duration(&mut self, duration: f64) -> Result<(), DomainError> {
        Self::check_duration(duration)?;
        let (start, end) = (self.start_seconds, self.end_seconds);
        self.duration = duration;
        self.seed(start, end);
        Ok(())
    }

    /// Convert a normalized track position to seconds
    pub fn fraction_to_seconds(&self, fraction: f64) -> f64 {
        sanitize(fraction).clamp(0.0, 1.0) * self.duration
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value
    }
}
