//! Detection records and the JSONL frame stream.
//!
//! A detection source produces one unordered list of [`RawDetection`]s per
//! frame. Recorded sessions store one [`DetectionFrame`] per line; blank
//! lines and lines starting with `#` are ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use steadybox_common::error::{SteadyboxError, SteadyboxResult};

use crate::geometry::BoxRect;

/// Frame counter since the start of a stream.
pub type FrameIndex = u64;

/// A single detector output, read-only to the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    /// Corner-form rectangle in pixels.
    #[serde(rename = "box")]
    pub bbox: BoxRect,

    /// Detector confidence in [0, 1].
    pub confidence: f32,

    /// Detector class index.
    pub class_id: u32,

    /// Human-readable class label.
    pub class_name: String,
}

impl RawDetection {
    pub fn new(
        bbox: BoxRect,
        confidence: f32,
        class_id: u32,
        class_name: impl Into<String>,
    ) -> Self {
        Self {
            bbox,
            confidence,
            class_id,
            class_name: class_name.into(),
        }
    }
}

/// All detections produced for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionFrame {
    #[serde(rename = "frame")]
    pub index: FrameIndex,

    #[serde(default)]
    pub detections: Vec<RawDetection>,
}

impl DetectionFrame {
    pub fn new(index: FrameIndex, detections: Vec<RawDetection>) -> Self {
        Self { index, detections }
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}

/// Count detections per class name, ordered by name.
pub fn class_summary(detections: &[RawDetection]) -> BTreeMap<&str, usize> {
    let mut summary = BTreeMap::new();
    for d in detections {
        *summary.entry(d.class_name.as_str()).or_insert(0) += 1;
    }
    summary
}

/// Parse one JSONL line. Returns `Ok(None)` for blank and comment lines.
///
/// `line_number` is 1-based and only used for error reporting.
pub fn parse_frame_line(line: &str, line_number: usize) -> SteadyboxResult<Option<DetectionFrame>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|e| SteadyboxError::replay(line_number, e.to_string()))
}

/// Parse frames from JSONL content (one JSON object per line).
pub fn parse_frames(jsonl: &str) -> SteadyboxResult<Vec<DetectionFrame>> {
    let mut frames = Vec::new();
    for (i, line) in jsonl.lines().enumerate() {
        if let Some(frame) = parse_frame_line(line, i + 1)? {
            frames.push(frame);
        }
    }
    Ok(frames)
}

/// Serialize frames to JSONL format.
pub fn serialize_frames(frames: &[DetectionFrame]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for frame in frames {
        output.push_str(&serde_json::to_string(frame)?);
        output.push('\n');
    }
    Ok(output)
}
