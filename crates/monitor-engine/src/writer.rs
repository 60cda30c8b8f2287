//! Append-only JSONL writer for smoothed track output.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use steadybox_common::config::TrackerConfig;
use steadybox_common::error::{SteadyboxError, SteadyboxResult};
use steadybox_detection_model::detection::FrameIndex;
use steadybox_tracking_core::TrackedDetection;

/// Metadata written as the first (comment) line of a track stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackStreamHeader {
    pub schema_version: String,
    pub epoch_wall: String,
    pub tracker: TrackerConfig,
}

impl TrackStreamHeader {
    pub fn new(epoch_wall: impl Into<String>, tracker: TrackerConfig) -> Self {
        Self {
            schema_version: "1.0".to_string(),
            epoch_wall: epoch_wall.into(),
            tracker,
        }
    }
}

/// One line of the track stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackFrameRecord {
    pub frame: FrameIndex,
    pub tracks: Vec<TrackedDetection>,
}

/// Writes live tracks to a JSONL file, one line per processed frame.
pub struct TrackWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    frames_written: u64,
}

impl TrackWriter {
    /// Create the file (truncating), writing the header as a `#` line.
    pub fn create(path: &Path, header: &TrackStreamHeader) -> SteadyboxResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        let mut writer = BufWriter::new(file);

        let header_json = serde_json::to_string(header)?;
        writeln!(writer, "# {header_json}")
            .map_err(|e| SteadyboxError::render(format!("Failed to write header: {e}")))?;

        Ok(Self {
            writer,
            path: path.to_path_buf(),
            frames_written: 0,
        })
    }

    pub fn write_frame(&mut self, frame: FrameIndex, tracks: &[TrackedDetection]) -> SteadyboxResult<()> {
        #[derive(Serialize)]
        struct Line<'a> {
            frame: FrameIndex,
            tracks: &'a [TrackedDetection],
        }

        let json = serde_json::to_string(&Line { frame, tracks })?;
        writeln!(self.writer, "{json}")
            .map_err(|e| SteadyboxError::render(format!("Failed to write frame {frame}: {e}")))?;
        self.frames_written += 1;

        if self.frames_written % 500 == 0 {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> SteadyboxResult<()> {
        self.writer
            .flush()
            .map_err(|e| SteadyboxError::render(format!("Failed to flush tracks: {e}")))
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TrackWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// Parse a track stream, skipping the header and blank lines.
pub fn read_track_stream(content: &str) -> SteadyboxResult<Vec<TrackFrameRecord>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|e| SteadyboxError::replay(i + 1, e.to_string()))
        })
        .collect()
}
