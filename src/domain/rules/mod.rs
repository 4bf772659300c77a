// Domain rules - Business logic and policies

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::utils::time::TimeCodec;

static YOUTUBE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://)?(www\.|m\.)?(youtube\.com|youtu\.be)/.+$")
        .expect("youtube url pattern is valid")
});

/// Business rules for quality availability and selection
pub struct QualitySelector;

impl QualitySelector {
    /// A quality is available if any format's resolution label carries its token
    pub fn is_quality_available(quality: Quality, formats: &[FormatDescriptor]) -> bool {
        formats
            .iter()
            .any(|format| quality.matches_resolution(&format.resolution))
    }

    /// First entry of `preference` that is available
    pub fn best_available_quality(
        formats: &[FormatDescriptor],
        preference: &[Quality],
    ) -> Option<Quality> {
        preference
            .iter()
            .copied()
            .find(|quality| Self::is_quality_available(*quality, formats))
    }

    /// All available levels, in canonical order
    pub fn available_qualities(formats: &[FormatDescriptor]) -> Vec<Quality> {
        Quality::ALL
            .iter()
            .copied()
            .filter(|quality| Self::is_quality_available(*quality, formats))
            .collect()
    }

    /// Format to request for a quality; the service lists formats highest first
    pub fn format_for_quality(
        quality: Quality,
        formats: &[FormatDescriptor],
    ) -> Option<&FormatDescriptor> {
        formats
            .iter()
            .find(|format| quality.matches_resolution(&format.resolution))
    }

    /// Keep `current` if still available, otherwise fall back to the best one
    pub fn reconcile(
        current: Option<Quality>,
        formats: &[FormatDescriptor],
        preference: &[Quality],
    ) -> Option<Quality> {
        match current {
            Some(quality) if Self::is_quality_available(quality, formats) => Some(quality),
            _ => Self::best_available_quality(formats, preference),
        }
    }
}

/// Validation applied before anything is sent to the service
pub struct SubmissionValidator;

impl SubmissionValidator {
    /// Structural check on the source URL
    pub fn is_valid_url(url: &str) -> bool {
        YOUTUBE_URL.is_match(url.trim())
    }

    pub fn validate_url(url: &str) -> Result<(), DomainError> {
        if url.trim().is_empty() {
            return Err(DomainError::Validation(
                "Please enter a YouTube URL".to_string(),
            ));
        }
        if !Self::is_valid_url(url) {
            return Err(DomainError::Validation(format!(
                "Please enter a valid YouTube URL: {}",
                url.trim()
            )));
        }
        Ok(())
    }

    /// Strict check of every clip's timecodes and ordering
    pub fn validate_clips(clips: &[ClipData]) -> Result<(), DomainError> {
        if clips.is_empty() {
            return Err(DomainError::Validation(
                "Please add at least one clip".to_string(),
            ));
        }

        for (index, clip) in clips.iter().enumerate() {
            let name = clip
                .title
                .clone()
                .unwrap_or_else(|| format!("Clip {}", index + 1));

            if !TimeCodec::is_valid_timecode_format(&clip.start_time)
                || !TimeCodec::is_valid_timecode_format(&clip.end_time)
            {
                return Err(DomainError::Validation(format!(
                    "{}: please use HH:MM:SS format for start and end times",
                    name
                )));
            }

            let start = TimeCodec::parse_timecode(&clip.start_time);
            let end = TimeCodec::parse_timecode(&clip.end_time);
            if start >= end {
                return Err(DomainError::Validation(format!(
                    "{}: start time ({}) must be before end time ({})",
                    name, clip.start_time, clip.end_time
                )));
            }
        }

        Ok(())
    }

    /// Validate a complete job request
    pub fn validate_request(request: &JobRequest) -> Result<(), DomainError> {
        if let Some(url) = request.youtube_url() {
            Self::validate_url(url)?;
        }

        match request {
            JobRequest::Download { .. } => Ok(()),
            JobRequest::FromVideo { video_id, clips } => {
                if matches!(video_id, Some(id) if id.trim().is_empty()) {
                    return Err(DomainError::Validation(
                        "Video id cannot be empty".to_string(),
                    ));
                }
                Self::validate_clips(clips)
            }
            JobRequest::Unified { clips, .. } | JobRequest::Legacy { clips, .. } => {
                Self::validate_clips(clips)
            }
        }
    }
}

/// Advisory progress estimate for services that do not report a percentage
pub struct ProgressEstimator;

impl ProgressEstimator {
    /// Fixed estimate while the source video is downloading
    pub const DOWNLOADING_PERCENT: f64 = 10.0;

    pub fn estimate(phase: JobPhase, completed_clips: u32, total_clips: u32) -> f64 {
        match phase {
            JobPhase::Idle | JobPhase::Submitting => 0.0,
            JobPhase::Downloading => Self::DOWNLOADING_PERCENT,
            JobPhase::Processing => {
                if total_clips == 0 {
                    0.0
                } else {
                    (completed_clips as f64 / total_clips as f64 * 100.0).min(100.0)
                }
            }
            JobPhase::Completed => 100.0,
            JobPhase::Error => 0.0,
        }
    }
}

#[cfg(test)]
mod tests;
