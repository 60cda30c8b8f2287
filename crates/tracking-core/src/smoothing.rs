//! Box geometry smoothing.
//!
//! Each matched track moves toward its new detection by an exponential
//! moving average applied per coordinate. Only geometry is filtered;
//! confidence and class always take the newest detection's values.

use steadybox_common::config::validate_smoothing_factor;
use steadybox_common::error::SteadyboxResult;
use steadybox_detection_model::geometry::BoxRect;

/// EMA filter over box corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSmoother {
    factor: f64,
}

impl BoxSmoother {
    /// Create a smoother with weight `factor` on the newest box, in (0, 1].
    pub fn new(factor: f64) -> SteadyboxResult<Self> {
        validate_smoothing_factor(factor)?;
        Ok(Self { factor })
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// `trunc(old * (1 - factor) + new * factor)` for every coordinate,
    /// evaluated as `old + (new - old) * factor` so a box matched against
    /// itself never loses a pixel to rounding.
    ///
    /// The two forms are equal in exact arithmetic but not in `f64`, so the
    /// output can be one pixel off from a tracker that evaluates the
    /// weighted sum literally. With factor 0.3 and `old == new == 6` the
    /// literal sum is `5.999…` and truncates to 5, while this returns 6.
    pub fn smooth(&self, old: &BoxRect, new: &BoxRect) -> BoxRect {
        let o = old.coords();
        let n = new.coords();
        let out: [i32; 4] = std::array::from_fn(|k| blend(o[k], n[k], self.factor));
        BoxRect::from(out)
    }
}

impl Default for BoxSmoother {
    /// Factor 0.3.
    fn default() -> Self {
        Self { factor: 0.3 }
    }
}

fn blend(old: i32, new: i32, factor: f64) -> i32 {
    let old = old as f64;
    (old + (new as f64 - old) * factor).trunc() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factor_one_snaps_to_new_box() {
        let smoother = BoxSmoother::new(1.0).unwrap();
        let old = BoxRect::new(0, 0, 100, 100);
        let new = BoxRect::new(37, 41, 173, 199);
        assert_eq!(smoother.smooth(&old, &new), new);
    }

    #[test]
    fn test_half_factor_truncates() {
        let smoother = BoxSmoother::new(0.5).unwrap();
        let old = BoxRect::new(0, 0, 10, 10);
        let new = BoxRect::new(3, 3, 13, 13);
        // 1.5 -> 1, 11.5 -> 11
        assert_eq!(smoother.smooth(&old, &new), BoxRect::new(1, 1, 11, 11));
    }

    #[test]
    fn test_truncation_is_toward_zero_for_negative_values() {
        let smoother = BoxSmoother::new(0.5).unwrap();
        let old = BoxRect::new(-10, -10, 0, 0);
        let new = BoxRect::new(-7, -7, 3, 3);
        // -8.5 -> -8, 1.5 -> 1
        assert_eq!(smoother.smooth(&old, &new), BoxRect::new(-8, -8, 1, 1));
    }

    #[test]
    fn test_small_factor_barely_moves() {
        let smoother = BoxSmoother::new(0.001).unwrap();
        let start = BoxRect::new(100, 100, 200, 200);
        let target = BoxRect::new(110, 110, 210, 210);

        let mut current = start;
        for _ in 0..50 {
            current = smoother.smooth(&current, &target);
        }
        assert_eq!(current, start);
    }

    #[test]
    fn test_identical_boxes_are_stable() {
        // 6 * 0.7 + 6 * 0.3 evaluates just below 6.0 in binary floating point
        let smoother = BoxSmoother::default();
        let b = BoxRect::new(3, 6, 12, 23);
        for _ in 0..10 {
            assert_eq!(smoother.smooth(&b, &b), b);
        }
    }

    #[test]
    fn test_differs_from_literal_weighted_sum() {
        let factor = 0.3;
        let literal = |old: i32, new: i32| {
            (f64::from(old) * (1.0 - factor) + f64::from(new) * factor).trunc() as i32
        };
        assert_eq!(literal(6, 6), 5);
        assert_eq!(blend(6, 6, factor), 6);

        // away from the rounding edge both forms agree
        assert_eq!(literal(0, 10), 3);
        assert_eq!(blend(0, 10, factor), 3);
    }

    #[test]
    fn test_rejects_out_of_range_factor() {
        assert!(BoxSmoother::new(0.0).is_err());
        assert!(BoxSmoother::new(1.01).is_err());
        assert_eq!(BoxSmoother::new(1.0).unwrap().factor(), 1.0);
    }
}
