//! Ordered set of committed clips

use crate::domain::errors::DomainError;
use crate::domain::model::{Clip, ClipData, ClipField, ClipId, TimeRange};
use crate::utils::time::TimeCodec;

/// Clips the user has committed, in insertion order
#[derive(Debug, Clone, Default)]
pub struct ClipSet {
    clips: Vec<Clip>,
}

impl ClipSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit a range snapshot as a new clip
    pub fn add(&mut self, title: Option<&str>, range: TimeRange) -> ClipId {
        let clip = Clip {
            id: ClipId::new(),
            title: normalize_title(title),
            start_time: TimeCodec::from_seconds_f64(range.start_seconds),
            end_time: TimeCodec::from_seconds_f64(range.end_seconds),
        };
        let id = clip.id;
        self.clips.push(clip);
        id
    }

    /// Edit one field of a clip
    ///
    /// Time fields are stored as typed; they are only validated strictly at
    /// submission so that partially typed values are accepted here.
    pub fn update_field(&mut self, id: ClipId, field: ClipField, value: &str) -> Result<(), DomainError> {
        let clip = self
            .clips
            .iter_mut()
            .find(|clip| clip.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("clip {}", id)))?;

        match field {
            ClipField::Title => clip.title = normalize_title(Some(value)),
            ClipField::StartTime => clip.start_time = value.to_string(),
            ClipField::EndTime => clip.end_time = value.to_string(),
        }
        Ok(())
    }

    /// Overwrite a clip's stored times from a range
    pub fn set_times(&mut self, id: ClipId, range: TimeRange) -> Result<(), DomainError> {
        self.update_field(id, ClipField::StartTime, &TimeCodec::from_seconds_f64(range.start_seconds))?;
        self.update_field(id, ClipField::EndTime, &TimeCodec::from_seconds_f64(range.end_seconds))
    }

    pub fn remove(&mut self, id: ClipId) -> Option<Clip> {
        let index = self.clips.iter().position(|clip| clip.id == id)?;
        Some(self.clips.remove(index))
    }

    pub fn get(&self, id: ClipId) -> Option<&Clip> {
        self.clips.iter().find(|clip| clip.id == id)
    }

    /// Clip at a zero-based position
    pub fn get_index(&self, index: usize) -> Option<&Clip> {
        self.clips.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clip> {
        self.clips.iter()
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Payload for a submission
    pub fn to_clip_data(&self) -> Vec<ClipData> {
        self.clips.iter().map(Clip::to_clip_data).collect()
    }
}

fn normalize_title(title: Option<&str>) -> Option<String> {
    title
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(str::to_string)
}
