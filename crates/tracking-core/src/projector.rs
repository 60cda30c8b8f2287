//! Projection of live tracks into detection-shaped output.
//!
//! Output order is the tracker's iteration order (creation order). It is not
//! a ranking, and consumers should not rely on positions across frames.

use serde::{Deserialize, Serialize};
use steadybox_detection_model::detection::RawDetection;

use crate::track::{Track, TrackId};

/// A live track with its identity attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedDetection {
    pub id: TrackId,
    pub life: u32,
    #[serde(flatten)]
    pub detection: RawDetection,
}

/// One detection per track with `life > 0`.
pub fn project<'a>(tracks: impl IntoIterator<Item = &'a Track>) -> Vec<RawDetection> {
    tracks
        .into_iter()
        .filter(|t| t.is_alive())
        .map(Track::to_detection)
        .collect()
}

/// Like [`project`], keeping track ids and life.
pub fn project_tracked<'a>(tracks: impl IntoIterator<Item = &'a Track>) -> Vec<TrackedDetection> {
    tracks
        .into_iter()
        .filter(|t| t.is_alive())
        .map(|t| TrackedDetection {
            id: t.id(),
            life: t.life(),
            detection: t.to_detection(),
        })
        .collect()
}
