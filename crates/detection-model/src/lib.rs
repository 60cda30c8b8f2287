//! Steadybox Detection Model
//!
//! Defines the data contracts shared by detectors, the tracker, and
//! downstream consumers:
//! - **Geometry:** Corner-form pixel rectangles and IOU
//! - **Detections:** Per-frame detector output and the JSONL frame stream
//! - **Filter:** Confidence / class gating applied before tracking
//! - **Labels:** Overlay label text and class colours
//!
//! All coordinates are integer pixels in capture space.

pub mod detection;
pub mod filter;
pub mod geometry;
pub mod label;

pub use detection::*;
pub use filter::DetectionFilter;
pub use geometry::*;
