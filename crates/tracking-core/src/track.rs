//! Tracked object state.

use std::fmt;

use serde::{Deserialize, Serialize};
use steadybox_detection_model::detection::RawDetection;
use steadybox_detection_model::geometry::BoxRect;

use crate::history::BoxHistory;

/// Stable track identifier, assigned in creation order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub u64);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Life points a track loses per decay step.
pub const DECAY_STEP: u32 = 2;

/// A persistent object observed across frames.
///
/// `life` drives the lifecycle: +1 per matched frame, -[`DECAY_STEP`] per
/// decay, never below zero. Tracks with zero life are not reported and are
/// removed the next time they go unmatched in a frame with detections.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    id: TrackId,
    bbox: BoxRect,
    confidence: f32,
    class_id: u32,
    class_name: String,
    life: u32,
    hits: u32,
    history: BoxHistory,
}

impl Track {
    /// New track seeded from an unmatched detection.
    pub(crate) fn spawn(id: TrackId, detection: &RawDetection, history_size: usize) -> Self {
        Self {
            id,
            bbox: detection.bbox,
            confidence: detection.confidence,
            class_id: detection.class_id,
            class_name: detection.class_name.clone(),
            life: 1,
            hits: 0,
            history: BoxHistory::seeded(detection.bbox, history_size),
        }
    }

    /// Apply a matched detection whose geometry has already been smoothed.
    pub(crate) fn absorb(&mut self, smoothed: BoxRect, detection: &RawDetection) {
        self.bbox = smoothed;
        self.confidence = detection.confidence;
        self.class_id = detection.class_id;
        if self.class_name != detection.class_name {
            self.class_name.clone_from(&detection.class_name);
        }
        self.life = self.life.saturating_add(1);
        self.hits = self.hits.saturating_add(1);
        self.history.push(smoothed);
    }

    pub(crate) fn decay(&mut self) {
        self.life = self.life.saturating_sub(DECAY_STEP);
    }

    pub(crate) fn history_mut(&mut self) -> &mut BoxHistory {
        &mut self.history
    }

    pub fn id(&self) -> TrackId {
        self.id
    }

    /// Smoothed geometry.
    pub fn bbox(&self) -> BoxRect {
        self.bbox
    }

    /// Confidence of the latest matched detection.
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn class_id(&self) -> u32 {
        self.class_id
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn life(&self) -> u32 {
        self.life
    }

    /// Matched updates since creation.
    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0
    }

    pub fn history(&self) -> &BoxHistory {
        &self.history
    }

    /// The track in detection shape.
    pub fn to_detection(&self) -> RawDetection {
        RawDetection {
            bbox: self.bbox,
            confidence: self.confidence,
            class_id: self.class_id,
            class_name: self.class_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(x: i32, confidence: f32, class_id: u32, name: &str) -> RawDetection {
        RawDetection::new(BoxRect::new(x, 0, x + 10, 10), confidence, class_id, name)
    }

    #[test]
    fn test_spawn_mirrors_detection() {
        let d = det(5, 0.8, 0, "person");
        let t = Track::spawn(TrackId(1), &d, 5);
        assert_eq!(t.life(), 1);
        assert_eq!(t.hits(), 0);
        assert_eq!(t.to_detection(), d);
        assert_eq!(t.history().to_vec(), vec![d.bbox]);
    }

    #[test]
    fn test_absorb_snaps_metadata() {
        let mut t = Track::spawn(TrackId(1), &det(0, 0.8, 0, "person"), 5);
        let smoothed = BoxRect::new(1, 0, 11, 10);
        t.absorb(smoothed, &det(4, 0.6, 2, "car"));

        assert_eq!(t.bbox(), smoothed);
        assert_eq!(t.confidence(), 0.6);
        assert_eq!(t.class_id(), 2);
        assert_eq!(t.class_name(), "car");
        assert_eq!(t.life(), 2);
        assert_eq!(t.history().latest(), Some(&smoothed));
    }

    #[test]
    fn test_decay_floors_at_zero() {
        let mut t = Track::spawn(TrackId(1), &det(0, 0.8, 0, "person"), 5);
        t.decay();
        assert_eq!(t.life(), 0);
        assert!(!t.is_alive());
        t.decay();
        assert_eq!(t.life(), 0);
    }

    #[test]
    fn test_display_id() {
        assert_eq!(TrackId(42).to_string(), "#42");
    }
}
