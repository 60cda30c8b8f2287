//! Pre-tracking detection filter.
//!
//! Drops detections the tracker should never see: low-confidence boxes and
//! classes outside the configured allow-list.

use steadybox_common::config::DetectorConfig;

use crate::detection::RawDetection;

/// Confidence floor plus optional class allow-list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionFilter {
    pub min_confidence: f64,
    pub classes: Option<Vec<u32>>,
}

impl DetectionFilter {
    /// A filter that keeps everything.
    pub fn pass_through() -> Self {
        Self::default()
    }

    pub fn from_config(config: &DetectorConfig) -> Self {
        Self {
            min_confidence: config.confidence_threshold,
            classes: config.classes.clone(),
        }
    }

    pub fn accepts(&self, detection: &RawDetection) -> bool {
        if (detection.confidence as f64) < self.min_confidence {
            return false;
        }
        match &self.classes {
            Some(classes) => classes.contains(&detection.class_id),
            None => true,
        }
    }

    /// Keep accepted detections, preserving order.
    pub fn apply(&self, detections: Vec<RawDetection>) -> Vec<RawDetection> {
        detections.into_iter().filter(|d| self.accepts(d)).collect()
    }
}
