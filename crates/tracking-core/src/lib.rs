//! Steadybox Tracking Core
//!
//! Turns noisy per-frame object detections into temporally smoothed,
//! persistent tracks:
//! - **Association:** greedy IOU matching of detections to tracks
//! - **Smoothing:** exponential moving average over box corners
//! - **Lifecycle:** life counters that create, decay, and retire tracks
//!
//! Pure computation. No I/O, no clocks, no platform dependencies.

pub mod association;
pub mod history;
pub mod observer;
pub mod projector;
pub mod smoothing;
pub mod track;
pub mod tracker;

pub use association::{associate, greedy_match, Association, IouMatrix, Match, MatchResult};
pub use history::BoxHistory;
pub use observer::{FrameReport, NoopObserver, TracingObserver, TrackerObserver};
pub use projector::{project, project_tracked, TrackedDetection};
pub use smoothing::BoxSmoother;
pub use steadybox_common::config::{DecayPolicy, TrackerConfig};
pub use track::{Track, TrackId, DECAY_STEP};
pub use tracker::DetectionSmoother;
