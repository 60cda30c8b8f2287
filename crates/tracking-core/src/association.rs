//! Greedy IOU association between detections and tracks.
//!
//! # Algorithm
//!
//! 1. **Matrix**: compute IOU for every (detection, track) pair.
//! 2. **Scan**: find the maximum over cells whose row and column are still
//!    available, scanning row-major (detection ascending, then track
//!    ascending). Ties go to the first cell reached in that order.
//! 3. **Accept or stop**: if the maximum reaches the threshold, record the
//!    pair and retire its row and column; otherwise stop, since every
//!    remaining cell is no larger.
//! 4. Repeat at most `min(rows, cols)` times.
//!
//! This is not an optimal assignment. It is cheap and deterministic for the
//! tens of boxes a single frame carries.

use steadybox_detection_model::geometry::{iou, BoxRect};

use crate::track::TrackId;

/// Dense row-major IOU matrix; rows are detections, columns are tracks.
#[derive(Debug, Clone, PartialEq)]
pub struct IouMatrix {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl IouMatrix {
    pub fn build(detections: &[BoxRect], tracks: &[BoxRect]) -> Self {
        let mut values = Vec::with_capacity(detections.len() * tracks.len());
        for d in detections {
            for t in tracks {
                values.push(iou(d, t));
            }
        }
        Self {
            rows: detections.len(),
            cols: tracks.len(),
            values,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.cols + col]
    }
}

/// Index-level result of [`greedy_match`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchResult {
    /// Accepted `(row, col, iou)` triples in acceptance order.
    pub pairs: Vec<(usize, usize, f64)>,
    /// Rows never consumed, ascending.
    pub unmatched_rows: Vec<usize>,
    /// Columns never consumed, ascending.
    pub unmatched_cols: Vec<usize>,
}

/// Greedy max-IOU matching with row-major first-max tie-breaking.
pub fn greedy_match(matrix: &IouMatrix, threshold: f64) -> MatchResult {
    let rows = matrix.rows();
    let cols = matrix.cols();
    let mut row_used = vec![false; rows];
    let mut col_used = vec![false; cols];
    let mut pairs = Vec::with_capacity(rows.min(cols));

    for _ in 0..rows.min(cols) {
        let mut best: Option<(usize, usize, f64)> = None;
        for r in (0..rows).filter(|&r| !row_used[r]) {
            for c in (0..cols).filter(|&c| !col_used[c]) {
                let value = matrix.get(r, c);
                // strict comparison keeps the first maximum in scan order
                if best.map_or(true, |(_, _, b)| value > b) {
                    best = Some((r, c, value));
                }
            }
        }

        let Some((r, c, value)) = best else { break };
        if value < threshold {
            break;
        }

        row_used[r] = true;
        col_used[c] = true;
        pairs.push((r, c, value));
    }

    MatchResult {
        pairs,
        unmatched_rows: (0..rows).filter(|&r| !row_used[r]).collect(),
        unmatched_cols: (0..cols).filter(|&c| !col_used[c]).collect(),
    }
}

/// A detection assigned to a track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    pub detection: usize,
    pub track: TrackId,
    pub iou: f64,
}

/// Identifier-level association for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Association {
    pub matches: Vec<Match>,
    pub unmatched_detections: Vec<usize>,
    pub unmatched_tracks: Vec<TrackId>,
}

/// Associate detection boxes with tracks.
///
/// `tracks` must be in the tracker's iteration order (ascending id); that
/// order defines the column order and therefore the tie-break.
pub fn associate(detections: &[BoxRect], tracks: &[(TrackId, BoxRect)], threshold: f64) -> Association {
    if tracks.is_empty() {
        return Association {
            matches: Vec::new(),
            unmatched_detections: (0..detections.len()).collect(),
            unmatched_tracks: Vec::new(),
        };
    }

    let track_boxes: Vec<BoxRect> = tracks.iter().map(|(_, b)| *b).collect();
    let matrix = IouMatrix::build(detections, &track_boxes);
    let result = greedy_match(&matrix, threshold);

    Association {
        matches: result
            .pairs
            .iter()
            .map(|&(r, c, iou)| Match {
                detection: r,
                track: tracks[c].0,
                iou,
            })
            .collect(),
        unmatched_detections: result.unmatched_rows,
        unmatched_tracks: result.unmatched_cols.iter().map(|&c| tracks[c].0).collect(),
    }
}
