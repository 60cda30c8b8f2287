//! Pointer targeting.
//!
//! Picks the largest live detection and aims at the horizontal center of
//! its top band. `target_percent` is the fraction of the box height that
//! forms the band (0.2 aims at the middle of the top fifth).

use steadybox_common::config::PointerConfig;
use steadybox_detection_model::detection::RawDetection;
use steadybox_platform_core::MonitorRegion;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerTargeter {
    target_percent: f64,
    region: Option<MonitorRegion>,
}

impl PointerTargeter {
    pub fn new(target_percent: f64) -> Self {
        Self {
            target_percent: target_percent.clamp(0.0, 1.0),
            region: None,
        }
    }

    pub fn from_config(config: &PointerConfig, region: Option<MonitorRegion>) -> Self {
        Self::new(config.target_percent).with_region(region)
    }

    /// Map frame coordinates into `region` and keep targets inside it.
    pub fn with_region(mut self, region: Option<MonitorRegion>) -> Self {
        self.region = region;
        self
    }

    pub fn target_percent(&self) -> f64 {
        self.target_percent
    }

    /// Values outside [0, 1] are clamped.
    pub fn set_target_percent(&mut self, percent: f64) {
        self.target_percent = percent.clamp(0.0, 1.0);
        tracing::info!(target_percent = self.target_percent, "Pointer target updated");
    }

    /// Screen point to move to, or `None` when nothing is tracked.
    pub fn target(&self, detections: &[RawDetection]) -> Option<(i32, i32)> {
        // ties keep the earliest detection
        let largest = detections.iter().fold(None::<&RawDetection>, |best, d| match best {
            Some(b) if b.bbox.area() >= d.bbox.area() => Some(b),
            _ => Some(d),
        })?;

        let b = largest.bbox;
        let x = ((i64::from(b.x1) + i64::from(b.x2)) / 2) as i32;
        let band = (i64::from(b.y2) - i64::from(b.y1)) as f64 * self.target_percent;
        let y = (f64::from(b.y1) + band / 2.0).trunc() as i32;

        Some(match self.region {
            Some(region) => {
                let (sx, sy) = region.to_screen(x, y);
                region.clamp_point(sx, sy)
            }
            None => (x, y),
        })
    }
}

impl Default for PointerTargeter {
    fn default() -> Self {
        Self::from_config(&PointerConfig::default(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use steadybox_detection_model::geometry::BoxRect;

    fn det(x1: i32, y1: i32, x2: i32, y2: i32) -> RawDetection {
        RawDetection::new(BoxRect::new(x1, y1, x2, y2), 0.9, 0, "person")
    }

    #[test]
    fn test_no_detections_no_target() {
        assert_eq!(PointerTargeter::default().target(&[]), None);
    }

    #[test]
    fn test_targets_top_band_of_largest_box() {
        let targeter = PointerTargeter::new(0.2);
        let detections = [det(0, 0, 10, 10), det(100, 200, 201, 400), det(5, 5, 20, 20)];
        // center x = 301 / 2 = 150; y = 200 + 200 * 0.2 / 2 = 220
        assert_eq!(targeter.target(&detections), Some((150, 220)));
    }

    #[test]
    fn test_equal_areas_keep_first() {
        let targeter = PointerTargeter::new(0.0);
        let detections = [det(0, 0, 10, 10), det(50, 50, 60, 60)];
        assert_eq!(targeter.target(&detections), Some((5, 0)));
    }

    #[test]
    fn test_percent_is_clamped() {
        let mut targeter = PointerTargeter::new(3.0);
        assert_eq!(targeter.target_percent(), 1.0);
        targeter.set_target_percent(-1.0);
        assert_eq!(targeter.target_percent(), 0.0);
    }

    #[test]
    fn test_full_percent_aims_at_box_center() {
        let targeter = PointerTargeter::new(1.0);
        assert_eq!(targeter.target(&[det(0, 0, 100, 50)]), Some((50, 25)));
    }

    #[test]
    fn test_full_range_box_does_not_overflow() {
        let targeter = PointerTargeter::new(1.0);
        let huge = det(i32::MIN, i32::MIN, i32::MAX, i32::MAX);
        // center of the full range, truncated toward zero
        assert_eq!(targeter.target(&[huge, det(0, 0, 10, 10)]), Some((0, 0)));
    }

    #[test]
    fn test_region_offsets_and_clamps() {
        let region = MonitorRegion::new(1000, 100, 200, 200);
        let targeter = PointerTargeter::new(0.2).with_region(Some(region));

        assert_eq!(targeter.target(&[det(0, 0, 100, 100)]), Some((1050, 110)));
        // box hanging past the region edge
        assert_eq!(targeter.target(&[det(180, 0, 400, 100)]), Some((1199, 110)));
    }
}
