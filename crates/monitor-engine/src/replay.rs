//! Recorded detection streams as frame sources.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use steadybox_common::error::{SteadyboxError, SteadyboxResult};
use steadybox_detection_model::detection::{parse_frame_line, DetectionFrame, RawDetection};
use steadybox_platform_core::{CapturedFrame, Detector, FrameSource};

/// Streams a JSONL detection recording one frame at a time.
///
/// Lines are read lazily, so a malformed line only fails the session when
/// the loop reaches it.
pub struct ReplaySource<R> {
    reader: R,
    name: String,
    line_number: usize,
    width: u32,
    height: u32,
    buf: String,
}

impl ReplaySource<BufReader<File>> {
    /// Open a recording on disk.
    pub fn open(path: &Path) -> SteadyboxResult<Self> {
        if !path.exists() {
            return Err(SteadyboxError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file), path.display().to_string()))
    }
}

impl<R: BufRead + Send> ReplaySource<R> {
    pub fn new(reader: R, name: impl Into<String>) -> Self {
        Self {
            reader,
            name: name.into(),
            line_number: 0,
            width: 0,
            height: 0,
            buf: String::new(),
        }
    }

    /// Frame dimensions reported on every emitted frame.
    pub fn with_frame_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    fn next_record(&mut self) -> SteadyboxResult<Option<DetectionFrame>> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;
            if let Some(frame) = parse_frame_line(&self.buf, self.line_number)? {
                return Ok(Some(frame));
            }
        }
    }
}

impl<R: BufRead + Send> FrameSource for ReplaySource<R> {
    fn next_frame(&mut self) -> SteadyboxResult<Option<CapturedFrame>> {
        Ok(self.next_record()?.map(|record| {
            CapturedFrame::new(record.index, self.width, self.height)
                .with_detections(record.detections)
        }))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// In-memory frame source.
#[derive(Debug, Default)]
pub struct FrameQueue {
    frames: VecDeque<CapturedFrame>,
}

impl FrameQueue {
    pub fn new(frames: impl IntoIterator<Item = CapturedFrame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    /// One annotated frame per entry, numbered from zero.
    pub fn from_detections(frames: impl IntoIterator<Item = Vec<RawDetection>>) -> Self {
        Self::new(
            frames
                .into_iter()
                .enumerate()
                .map(|(i, d)| CapturedFrame::new(i as u64, 0, 0).with_detections(d)),
        )
    }

    pub fn from_records(records: Vec<DetectionFrame>) -> Self {
        Self::new(
            records
                .into_iter()
                .map(|r| CapturedFrame::new(r.index, 0, 0).with_detections(r.detections)),
        )
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameSource for FrameQueue {
    fn next_frame(&mut self) -> SteadyboxResult<Option<CapturedFrame>> {
        Ok(self.frames.pop_front())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Detector that returns the detections recorded on each frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReplayDetector;

impl Detector for ReplayDetector {
    fn detect(&mut self, frame: &CapturedFrame) -> SteadyboxResult<Vec<RawDetection>> {
        frame.detections.clone().ok_or_else(|| {
            SteadyboxError::detection(format!("Frame {} carries no recorded detections", frame.index))
        })
    }

    fn name(&self) -> &str {
        "replay"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const RECORDING: &str = "# steadybox recording\n\
{\"frame\":0,\"detections\":[{\"box\":[0,0,10,10],\"confidence\":0.9,\"class_id\":0,\"class_name\":\"person\"}]}\n\
\n\
{\"frame\":1}\n";

    #[test]
    fn test_replay_source_streams_frames() {
        let mut source = ReplaySource::new(Cursor::new(RECORDING), "inline").with_frame_size(640, 480);

        let first = source.next_frame().unwrap().unwrap();
        assert_eq!(first.index, 0);
        assert_eq!(first.width, 640);
        assert_eq!(first.detections.as_ref().map(Vec::len), Some(1));

        let second = source.next_frame().unwrap().unwrap();
        assert_eq!(second.index, 1);
        assert_eq!(second.detections, Some(vec![]));

        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_replay_source_reports_bad_line() {
        let mut source = ReplaySource::new(Cursor::new("{\"frame\":0}\n\nnot json\n"), "inline");
        assert!(source.next_frame().unwrap().is_some());

        let err = source.next_frame().unwrap_err();
        assert!(matches!(err, SteadyboxError::Replay { line: 3, .. }));
    }

    #[test]
    fn test_open_missing_file() {
        let result = ReplaySource::open(Path::new("/nonexistent/steadybox/frames.jsonl"));
        assert!(matches!(result, Err(SteadyboxError::FileNotFound { .. })));
    }

    #[test]
    fn test_replay_detector_requires_annotations() {
        let mut detector = ReplayDetector;
        assert!(detector.detect(&CapturedFrame::new(7, 0, 0)).is_err());

        let frame = CapturedFrame::new(8, 0, 0).with_detections(vec![]);
        assert!(detector.detect(&frame).unwrap().is_empty());
    }

    #[test]
    fn test_frame_queue_numbers_frames() {
        let mut queue = FrameQueue::from_detections(vec![vec![], vec![]]);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.next_frame().unwrap().unwrap().index, 0);
        assert_eq!(queue.next_frame().unwrap().unwrap().index, 1);
        assert!(queue.next_frame().unwrap().is_none());
    }
}
