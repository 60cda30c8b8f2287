//! Steadybox platform contracts.
//!
//! Narrow interfaces to the collaborators around the tracker: where frames
//! come from, who turns them into detections, and where smoothed output goes.
//! Concrete screen grabbers, inference runtimes, and overlay windows live
//! behind these traits so the session loop never couples to an OS backend.

use serde::{Deserialize, Serialize};
use steadybox_common::config::CaptureRegion;
use steadybox_common::error::SteadyboxResult;
use steadybox_detection_model::detection::{FrameIndex, RawDetection};

/// One frame handed over by a [`FrameSource`].
///
/// Pixel payloads are not modelled. Sources that already know the
/// detections (recordings, replays) attach them in `detections`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedFrame {
    pub index: FrameIndex,
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detections: Option<Vec<RawDetection>>,
}

impl CapturedFrame {
    pub fn new(index: FrameIndex, width: u32, height: u32) -> Self {
        Self {
            index,
            width,
            height,
            detections: None,
        }
    }

    pub fn with_detections(mut self, detections: Vec<RawDetection>) -> Self {
        self.detections = Some(detections);
        self
    }
}

/// Trait for frame producers (screen grabbers, replays).
pub trait FrameSource: Send {
    /// Next frame, or `None` once the source is exhausted.
    fn next_frame(&mut self) -> SteadyboxResult<Option<CapturedFrame>>;

    /// Source name for logging.
    fn name(&self) -> &str;
}

/// Trait for object detectors.
pub trait Detector: Send {
    /// Detect objects in a frame. An empty result is valid.
    fn detect(&mut self, frame: &CapturedFrame) -> SteadyboxResult<Vec<RawDetection>>;

    /// Detector name for logging.
    fn name(&self) -> &str;
}

/// Trait for overlay renderers.
pub trait OverlaySink: Send {
    /// Replace the drawn boxes with `detections`.
    fn present(&mut self, detections: &[RawDetection]) -> SteadyboxResult<()>;
}

/// Trait for pointer automation backends.
pub trait PointerDriver: Send {
    /// Move the pointer to absolute screen pixels.
    fn move_to(&mut self, x: i32, y: i32) -> SteadyboxResult<()>;
}

/// Screen rectangle being monitored, in absolute pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorRegion {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl MonitorRegion {
    pub fn new(left: i32, top: i32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i32 {
        self.left.saturating_add_unsigned(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i32 {
        self.top.saturating_add_unsigned(self.height)
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right() && y >= self.top && y < self.bottom()
    }

    /// Nearest point inside the region.
    pub fn clamp_point(&self, x: i32, y: i32) -> (i32, i32) {
        let max_x = self.right().saturating_sub(1).max(self.left);
        let max_y = self.bottom().saturating_sub(1).max(self.top);
        (x.clamp(self.left, max_x), y.clamp(self.top, max_y))
    }

    /// Convert region-relative coordinates to absolute screen pixels.
    pub fn to_screen(&self, x: i32, y: i32) -> (i32, i32) {
        (self.left.saturating_add(x), self.top.saturating_add(y))
    }
}

impl From<CaptureRegion> for MonitorRegion {
    fn from(region: CaptureRegion) -> Self {
        Self::new(region.left, region.top, region.width, region.height)
    }
}
