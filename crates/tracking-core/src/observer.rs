//! Tracker observability hooks.
//!
//! The tracker reports lifecycle events to an observer handed to it at
//! construction instead of logging through process-wide state. The default
//! [`TracingObserver`] turns them into `tracing` events.

use crate::track::{Track, TrackId};

/// Summary of one [`DetectionSmoother::update`](crate::DetectionSmoother::update) call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// 1-based invocation counter.
    pub frame: u64,
    /// Detections received.
    pub detections: usize,
    /// Detections that continued an existing track.
    pub matched: usize,
    /// Tracks created this frame.
    pub created: usize,
    /// Tracks removed this frame.
    pub removed: usize,
    /// Whether a decay step was applied.
    pub decayed: bool,
    /// Tracks reported to consumers (`life > 0`).
    pub live_tracks: usize,
    /// All tracks held, including exhausted ones awaiting removal.
    pub total_tracks: usize,
}

/// Receives tracker lifecycle events. Every method defaults to a no-op.
pub trait TrackerObserver: Send {
    fn track_created(&mut self, _track: &Track) {}

    fn track_updated(&mut self, _track: &Track, _iou: f64) {}

    fn track_removed(&mut self, _id: TrackId) {}

    fn frame_processed(&mut self, _report: &FrameReport) {}
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl TrackerObserver for NoopObserver {}

/// Emits structured `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl TrackerObserver for TracingObserver {
    fn track_created(&mut self, track: &Track) {
        tracing::debug!(
            id = %track.id(),
            class = track.class_name(),
            bbox = ?track.bbox().coords(),
            "Track created"
        );
    }

    fn track_updated(&mut self, track: &Track, iou: f64) {
        tracing::trace!(
            id = %track.id(),
            iou,
            life = track.life(),
            bbox = ?track.bbox().coords(),
            "Track updated"
        );
    }

    fn track_removed(&mut self, id: TrackId) {
        tracing::debug!(id = %id, "Track removed");
    }

    fn frame_processed(&mut self, report: &FrameReport) {
        tracing::trace!(
            frame = report.frame,
            detections = report.detections,
            matched = report.matched,
            created = report.created,
            removed = report.removed,
            decayed = report.decayed,
            live = report.live_tracks,
            total = report.total_tracks,
            "Frame smoothed"
        );
    }
}
