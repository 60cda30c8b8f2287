//! Axis-aligned pixel rectangles and intersection-over-union.
//!
//! Boxes use corner form `(x1, y1, x2, y2)` in integer pixels. Nothing here
//! validates input: degenerate or inverted rectangles have zero area and
//! produce an IOU of `0.0` against anything.

use serde::{Deserialize, Serialize};

/// A rectangle in corner form.
///
/// Serialized as a four-element array `[x1, y1, x2, y2]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct BoxRect {
    /// Left edge.
    pub x1: i32,
    /// Top edge.
    pub y1: i32,
    /// Right edge.
    pub x2: i32,
    /// Bottom edge.
    pub y2: i32,
}

impl BoxRect {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Coordinates as `[x1, y1, x2, y2]`.
    pub fn coords(&self) -> [i32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    /// Width, or zero for inverted boxes.
    pub fn width(&self) -> i64 {
        (self.x2 as i64 - self.x1 as i64).max(0)
    }

    /// Height, or zero for inverted boxes.
    pub fn height(&self) -> i64 {
        (self.y2 as i64 - self.y1 as i64).max(0)
    }

    /// Area in square pixels. Widened so boxes spanning the full `i32`
    /// range cannot overflow.
    pub fn area(&self) -> i128 {
        i128::from(self.width()) * i128::from(self.height())
    }

    /// `x1 < x2 && y1 < y2`.
    pub fn is_well_formed(&self) -> bool {
        self.x1 < self.x2 && self.y1 < self.y2
    }

    /// Integer center point (truncating division).
    pub fn center(&self) -> (i32, i32) {
        (
            ((self.x1 as i64 + self.x2 as i64) / 2) as i32,
            ((self.y1 as i64 + self.y2 as i64) / 2) as i32,
        )
    }

    /// Area shared with `other`, zero when they do not overlap.
    pub fn intersection_area(&self, other: &BoxRect) -> i128 {
        let ix1 = self.x1.max(other.x1) as i64;
        let iy1 = self.y1.max(other.y1) as i64;
        let ix2 = self.x2.min(other.x2) as i64;
        let iy2 = self.y2.min(other.y2) as i64;

        let w = ix2 - ix1;
        let h = iy2 - iy1;
        if w <= 0 || h <= 0 {
            return 0;
        }
        i128::from(w) * i128::from(h)
    }

    /// Intersection over union with `other`.
    pub fn iou(&self, other: &BoxRect) -> f64 {
        iou(self, other)
    }
}

impl From<[i32; 4]> for BoxRect {
    fn from(c: [i32; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

impl From<BoxRect> for [i32; 4] {
    fn from(b: BoxRect) -> Self {
        b.coords()
    }
}

/// Intersection area divided by union area.
///
/// Returns `0.0` when the boxes do not overlap or when the union is empty,
/// so malformed input never produces NaN.
pub fn iou(a: &BoxRect, b: &BoxRect) -> f64 {
    let inter = a.intersection_area(b);
    if inter == 0 {
        return 0.0;
    }

    let union = a.area() + b.area() - inter;
    if union <= 0 {
        return 0.0;
    }

    inter as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_identical_boxes() {
        let b = BoxRect::new(10, 20, 110, 220);
        assert_eq!(iou(&b, &b), 1.0);
    }

    #[test]
    fn test_disjoint_boxes() {
        let a = BoxRect::new(0, 0, 10, 10);
        let b = BoxRect::new(20, 20, 30, 30);
        assert_eq!(iou(&a, &b), 0.0);
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = BoxRect::new(0, 0, 10, 10);
        let b = BoxRect::new(10, 0, 20, 10);
        assert_eq!(iou(&a, &b), 0.0);
    }

    #[test]
    fn test_half_overlap() {
        let a = BoxRect::new(0, 0, 10, 10);
        let b = BoxRect::new(5, 0, 15, 10);
        // intersection 50, union 150
        assert!((iou(&a, &b) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_boxes_score_zero() {
        let point = BoxRect::new(5, 5, 5, 5);
        assert_eq!(iou(&point, &point), 0.0);

        let inverted = BoxRect::new(10, 10, 0, 0);
        let normal = BoxRect::new(0, 0, 10, 10);
        assert_eq!(iou(&inverted, &normal), 0.0);
        assert!(!inverted.is_well_formed());
    }

    #[test]
    fn test_serializes_as_array() {
        let b = BoxRect::new(1, 2, 3, 4);
        assert_eq!(serde_json::to_string(&b).unwrap(), "[1,2,3,4]");
        let parsed: BoxRect = serde_json::from_str("[1,2,3,4]").unwrap();
        assert_eq!(parsed, b);
    }

    #[test]
    fn test_center_and_area() {
        let b = BoxRect::new(0, 0, 11, 4);
        assert_eq!(b.center(), (5, 2));
        assert_eq!(b.area(), 44);
    }

    #[test]
    fn test_full_range_box() {
        let huge = BoxRect::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX);
        assert_eq!(huge.area(), (u32::MAX as i128) * (u32::MAX as i128));
        assert_eq!(iou(&huge, &huge), 1.0);

        let small = BoxRect::new(0, 0, 10, 10);
        let v = iou(&huge, &small);
        assert!(v > 0.0 && v < 1e-15);
        assert_eq!(v, iou(&small, &huge));
    }

    fn any_well_formed_box() -> impl Strategy<Value = BoxRect> {
        (any::<i32>(), any::<i32>(), any::<i32>(), any::<i32>())
            .prop_filter("needs x1 != x2 and y1 != y2", |(a, b, c, d)| a != c && b != d)
            .prop_map(|(a, b, c, d)| BoxRect::new(a.min(c), b.min(d), a.max(c), b.max(d)))
    }

    fn well_formed_box() -> impl Strategy<Value = BoxRect> {
        (-2000i32..2000, -2000i32..2000, 1i32..800, 1i32..800)
            .prop_map(|(x, y, w, h)| BoxRect::new(x, y, x + w, y + h))
    }

    proptest! {
        #[test]
        fn iou_is_symmetric(a in well_formed_box(), b in well_formed_box()) {
            prop_assert_eq!(iou(&a, &b), iou(&b, &a));
        }

        #[test]
        fn iou_is_bounded(a in well_formed_box(), b in well_formed_box()) {
            let v = iou(&a, &b);
            prop_assert!((0.0..=1.0).contains(&v));
        }

        #[test]
        fn iou_with_self_is_one(a in well_formed_box()) {
            prop_assert_eq!(iou(&a, &a), 1.0);
        }

        #[test]
        fn iou_holds_across_full_coordinate_range(
            a in any_well_formed_box(),
            b in any_well_formed_box(),
        ) {
            prop_assert_eq!(iou(&a, &a), 1.0);
            let v = iou(&a, &b);
            prop_assert!((0.0..=1.0).contains(&v));
            prop_assert_eq!(v, iou(&b, &a));
        }
    }
}
