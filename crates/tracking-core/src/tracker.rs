//! Track lifecycle management.
//!
//! [`DetectionSmoother`] owns the authoritative track set and runs one
//! frame at a time:
//!
//! 1. **Empty frame**: decay every track, report survivors.
//! 2. **Associate** detections with tracks by greedy IOU.
//! 3. **Update** matched tracks through the box smoother.
//! 4. **Create** tracks for unmatched detections.
//! 5. **Prune** unmatched tracks whose life is exhausted.
//! 6. **Project** live tracks into detection-shaped output.
//!
//! Under [`DecayPolicy::EmptyFrameOnly`] a track that misses a frame in
//! which other objects were detected keeps its life; it only ages on frames
//! with no detections at all. [`DecayPolicy::AnyUnmatched`] ages it on
//! every miss.

use std::collections::BTreeMap;

use steadybox_common::config::{
    validate_history_size, validate_iou_match_threshold, DecayPolicy, TrackerConfig,
};
use steadybox_common::error::SteadyboxResult;
use steadybox_detection_model::detection::RawDetection;
use steadybox_detection_model::geometry::BoxRect;

use crate::association::associate;
use crate::history::BoxHistory;
use crate::observer::{FrameReport, TrackerObserver, TracingObserver};
use crate::projector::{project, project_tracked, TrackedDetection};
use crate::smoothing::BoxSmoother;
use crate::track::{Track, TrackId};

/// Frame-to-frame detection smoother and lightweight multi-object tracker.
///
/// Single-threaded and synchronous. The type is `Send`; hosts that share it
/// across threads should hold one lock for a whole [`update`](Self::update).
pub struct DetectionSmoother {
    config: TrackerConfig,
    smoother: BoxSmoother,
    tracks: BTreeMap<TrackId, Track>,
    next_id: u64,
    frames: u64,
    last_report: FrameReport,
    observer: Box<dyn TrackerObserver>,
}

impl DetectionSmoother {
    /// Create a tracker that reports through [`TracingObserver`].
    pub fn new(config: TrackerConfig) -> SteadyboxResult<Self> {
        Self::with_observer(config, Box::new(TracingObserver))
    }

    /// Create a tracker with an injected observer.
    pub fn with_observer(
        config: TrackerConfig,
        observer: Box<dyn TrackerObserver>,
    ) -> SteadyboxResult<Self> {
        config.validate()?;
        Ok(Self {
            smoother: BoxSmoother::new(config.smoothing_factor)?,
            config,
            tracks: BTreeMap::new(),
            next_id: 1,
            frames: 0,
            last_report: FrameReport::default(),
            observer,
        })
    }

    /// Process one frame and return the live tracks in detection shape.
    pub fn update(&mut self, detections: &[RawDetection]) -> Vec<RawDetection> {
        self.step(detections);
        project(self.tracks.values())
    }

    /// Like [`update`](Self::update), keeping track identities.
    pub fn update_tracked(&mut self, detections: &[RawDetection]) -> Vec<TrackedDetection> {
        self.step(detections);
        project_tracked(self.tracks.values())
    }

    fn step(&mut self, detections: &[RawDetection]) {
        self.frames += 1;
        let mut report = FrameReport {
            frame: self.frames,
            detections: detections.len(),
            ..FrameReport::default()
        };

        if detections.is_empty() {
            for track in self.tracks.values_mut() {
                track.decay();
            }
            report.decayed = !self.tracks.is_empty();

            if self.config.decay_policy == DecayPolicy::AnyUnmatched {
                let all: Vec<TrackId> = self.tracks.keys().copied().collect();
                report.removed = self.remove_exhausted(&all);
            }

            self.finish_frame(report);
            return;
        }

        let candidates: Vec<(TrackId, BoxRect)> =
            self.tracks.iter().map(|(id, t)| (*id, t.bbox())).collect();
        let boxes: Vec<BoxRect> = detections.iter().map(|d| d.bbox).collect();
        let association = associate(&boxes, &candidates, self.config.iou_match_threshold);
        debug_assert!(association.matches.len() <= detections.len().min(candidates.len()));

        for m in &association.matches {
            let detection = &detections[m.detection];
            if let Some(track) = self.tracks.get_mut(&m.track) {
                let smoothed = self.smoother.smooth(&track.bbox(), &detection.bbox);
                track.absorb(smoothed, detection);
                self.observer.track_updated(track, m.iou);
            }
        }
        report.matched = association.matches.len();

        for &index in &association.unmatched_detections {
            self.spawn(&detections[index]);
        }
        report.created = association.unmatched_detections.len();

        if self.config.decay_policy == DecayPolicy::AnyUnmatched {
            for id in &association.unmatched_tracks {
                if let Some(track) = self.tracks.get_mut(id) {
                    track.decay();
                }
            }
            report.decayed = !association.unmatched_tracks.is_empty();
        }

        report.removed = self.remove_exhausted(&association.unmatched_tracks);
        self.finish_frame(report);
    }

    fn spawn(&mut self, detection: &RawDetection) {
        let id = TrackId(self.next_id);
        self.next_id += 1;
        let track = Track::spawn(id, detection, self.config.history_size);
        self.observer.track_created(&track);
        self.tracks.insert(id, track);
    }

    /// Remove the listed tracks whose life is already zero.
    fn remove_exhausted(&mut self, candidates: &[TrackId]) -> usize {
        let mut removed = 0;
        for id in candidates {
            if self.tracks.get(id).is_some_and(|t| t.life() == 0) {
                self.tracks.remove(id);
                self.observer.track_removed(*id);
                removed += 1;
            }
        }
        removed
    }

    fn finish_frame(&mut self, mut report: FrameReport) {
        report.total_tracks = self.tracks.len();
        report.live_tracks = self.tracks.values().filter(|t| t.is_alive()).count();
        self.observer.frame_processed(&report);
        self.last_report = report;
    }

    /// Live tracks in detection shape, without advancing a frame.
    pub fn active_detections(&self) -> Vec<RawDetection> {
        project(self.tracks.values())
    }

    /// Every held track in creation order, including exhausted ones.
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks.get(&id)
    }

    /// Recent smoothed boxes of a track, oldest first.
    pub fn history(&self, id: TrackId) -> Option<&BoxHistory> {
        self.tracks.get(&id).map(Track::history)
    }

    /// Number of held tracks.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Frames processed so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_report(&self) -> &FrameReport {
        &self.last_report
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn set_smoothing_factor(&mut self, factor: f64) -> SteadyboxResult<()> {
        self.smoother = BoxSmoother::new(factor)?;
        self.config.smoothing_factor = factor;
        Ok(())
    }

    pub fn set_iou_match_threshold(&mut self, threshold: f64) -> SteadyboxResult<()> {
        validate_iou_match_threshold(threshold)?;
        self.config.iou_match_threshold = threshold;
        Ok(())
    }

    /// Resize every track history; shrinking drops the oldest entries.
    pub fn set_history_size(&mut self, size: usize) -> SteadyboxResult<()> {
        validate_history_size(size)?;
        self.config.history_size = size;
        for track in self.tracks.values_mut() {
            track.history_mut().set_capacity(size);
        }
        Ok(())
    }

    pub fn set_decay_policy(&mut self, policy: DecayPolicy) {
        self.config.decay_policy = policy;
    }

    /// Drop every track. Identifiers keep increasing.
    pub fn clear(&mut self) {
        let ids: Vec<TrackId> = self.tracks.keys().copied().collect();
        self.tracks.clear();
        for id in ids {
            self.observer.track_removed(id);
        }
    }
}

impl std::fmt::Debug for DetectionSmoother {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectionSmoother")
            .field("config", &self.config)
            .field("tracks", &self.tracks.len())
            .field("next_id", &self.next_id)
            .field("frames", &self.frames)
            .finish()
    }
}
