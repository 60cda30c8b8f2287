//! Monitor session management.
//!
//! One tick of the loop: capture a frame, detect, filter, smooth, then hand
//! the live tracks to the overlay, the pointer, and the track writer.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use steadybox_common::clock::{FpsMeter, RateController, SessionClock};
use steadybox_common::config::AppConfig;
use steadybox_common::error::{SteadyboxError, SteadyboxResult};
use steadybox_detection_model::detection::RawDetection;
use steadybox_detection_model::filter::DetectionFilter;
use steadybox_platform_core::{
    CapturedFrame, Detector, FrameSource, MonitorRegion, OverlaySink, PointerDriver,
};
use steadybox_tracking_core::{DetectionSmoother, TrackedDetection};
use tokio::time::MissedTickBehavior;

use crate::pointer::PointerTargeter;
use crate::writer::{TrackStreamHeader, TrackWriter};

/// State of a monitor session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created but not started.
    Idle,
    /// Loop running.
    Running,
    /// Loop finished normally.
    Stopped,
    /// The loop ended with an error.
    Error,
}

/// Counters collected over a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionStats {
    /// Frames that went through the tracker.
    pub frames_processed: u64,
    /// Frames dropped because detection failed.
    pub frames_skipped: u64,
    /// Detections returned by the detector.
    pub raw_detections: u64,
    /// Detections that passed the filter.
    pub kept_detections: u64,
    pub tracks_created: u64,
    /// Live tracks after the latest frame.
    pub live_tracks: usize,
    pub peak_live_tracks: usize,
    pub pointer_moves: u64,
    /// Overlay and pointer failures.
    pub output_errors: u64,
    /// Rate over the last completed one-second window.
    pub fps: f64,
    pub elapsed_secs: f64,
}

impl SessionStats {
    /// Processed frames per second over the whole run.
    pub fn average_fps(&self) -> f64 {
        if self.elapsed_secs <= 0.0 {
            return 0.0;
        }
        self.frames_processed as f64 / self.elapsed_secs
    }
}

/// A monitor session that drives the collaborators and the tracker.
pub struct MonitorSession {
    state: SessionState,
    source: Box<dyn FrameSource>,
    detector: Box<dyn Detector>,
    overlay: Option<Box<dyn OverlaySink>>,
    pointer: Option<Box<dyn PointerDriver>>,
    targeter: PointerTargeter,
    pointer_enabled: bool,
    filter: DetectionFilter,
    smoother: DetectionSmoother,
    output_path: Option<PathBuf>,
    writer: Option<TrackWriter>,
    fps_limit: u32,
    stats_interval_secs: u64,
    stop_flag: Arc<AtomicBool>,
    stats: SessionStats,
}

impl MonitorSession {
    /// Create a session from application configuration.
    pub fn new(
        config: &AppConfig,
        source: Box<dyn FrameSource>,
        detector: Box<dyn Detector>,
    ) -> SteadyboxResult<Self> {
        let region = config.capture.region.map(MonitorRegion::from);
        Ok(Self {
            state: SessionState::Idle,
            source,
            detector,
            overlay: None,
            pointer: None,
            targeter: PointerTargeter::from_config(&config.pointer, region),
            pointer_enabled: config.pointer.enabled,
            filter: DetectionFilter::from_config(&config.detector),
            smoother: DetectionSmoother::new(config.tracker)?,
            output_path: None,
            writer: None,
            fps_limit: config.capture.fps_limit,
            stats_interval_secs: config.capture.stats_interval_secs,
            stop_flag: Arc::new(AtomicBool::new(false)),
            stats: SessionStats::default(),
        })
    }

    pub fn with_overlay(mut self, overlay: Box<dyn OverlaySink>) -> Self {
        self.overlay = Some(overlay);
        self
    }

    pub fn with_pointer(mut self, pointer: Box<dyn PointerDriver>) -> Self {
        self.pointer = Some(pointer);
        self
    }

    /// Write live tracks to a JSONL file at `path`.
    pub fn with_output(mut self, path: PathBuf) -> Self {
        self.output_path = Some(path);
        self
    }

    pub fn with_filter(mut self, filter: DetectionFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Replace the tracker, e.g. one built with a custom observer.
    pub fn with_smoother(mut self, smoother: DetectionSmoother) -> Self {
        self.smoother = smoother;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn smoother(&self) -> &DetectionSmoother {
        &self.smoother
    }

    /// Set the stop flag. The loop exits before its next frame.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    /// Get the stop flag for external coordination.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Run until the stop flag is set or the source is exhausted.
    pub async fn run(&mut self) -> SteadyboxResult<SessionStats> {
        if self.state != SessionState::Idle {
            return Err(SteadyboxError::capture("Session already started"));
        }
        self.state = SessionState::Running;

        let mut result = self.run_loop().await;
        if let Some(writer) = self.writer.as_mut() {
            let flushed = writer.flush();
            if result.is_ok() {
                result = flushed;
            }
        }
        self.state = match result {
            Ok(()) => SessionState::Stopped,
            Err(_) => SessionState::Error,
        };
        result.map(|()| self.stats.clone())
    }

    async fn run_loop(&mut self) -> SteadyboxResult<()> {
        let clock = SessionClock::start();
        if let Some(path) = &self.output_path {
            let header = TrackStreamHeader::new(clock.epoch_wall(), *self.smoother.config());
            self.writer = Some(TrackWriter::create(path, &header)?);
        }

        tracing::info!(
            source = self.source.name(),
            detector = self.detector.name(),
            fps_limit = self.fps_limit,
            pointer = self.pointer_enabled && self.pointer.is_some(),
            "Monitor session started"
        );

        let mut ticker = frame_period(self.fps_limit).map(|period| {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        });
        let mut meter = FpsMeter::new();
        let mut stats_gate =
            RateController::with_interval_ns(SessionClock::secs_to_ns(self.stats_interval_secs as f64));
        stats_gate.should_tick(0);

        while !self.stop_flag.load(Ordering::Relaxed) {
            match ticker.as_mut() {
                Some(interval) => {
                    interval.tick().await;
                }
                None => tokio::task::yield_now().await,
            }

            let Some(frame) = self.source.next_frame()? else {
                tracing::debug!("Frame source exhausted");
                break;
            };

            match self.detect(&frame) {
                Ok(detections) => {
                    let tracks = self.smoother.update_tracked(&detections);
                    self.record_frame(&tracks);
                    if let Some(writer) = self.writer.as_mut() {
                        writer.write_frame(frame.index, &tracks)?;
                    }
                    self.deliver(&tracks);
                }
                Err(e) => {
                    self.stats.frames_skipped += 1;
                    tracing::warn!(frame = frame.index, error = %e, "Frame skipped");
                }
            }

            let now = clock.elapsed_ns();
            meter.record(now);
            self.stats.fps = meter.fps();
            if self.stats_interval_secs > 0 && stats_gate.should_tick(now) {
                self.log_stats();
            }
        }

        self.stats.elapsed_secs = clock.elapsed_secs();
        tracing::info!(
            frames = self.stats.frames_processed,
            skipped = self.stats.frames_skipped,
            fps = self.stats.average_fps(),
            elapsed_secs = self.stats.elapsed_secs,
            "Monitor session finished"
        );
        Ok(())
    }

    fn detect(&mut self, frame: &CapturedFrame) -> SteadyboxResult<Vec<RawDetection>> {
        let raw = self.detector.detect(frame)?;
        self.stats.raw_detections += raw.len() as u64;
        let kept = self.filter.apply(raw);
        self.stats.kept_detections += kept.len() as u64;
        Ok(kept)
    }

    fn record_frame(&mut self, tracks: &[TrackedDetection]) {
        self.stats.frames_processed += 1;
        self.stats.tracks_created += self.smoother.last_report().created as u64;
        self.stats.live_tracks = tracks.len();
        self.stats.peak_live_tracks = self.stats.peak_live_tracks.max(tracks.len());
    }

    /// Push live tracks to the overlay and the pointer.
    fn deliver(&mut self, tracks: &[TrackedDetection]) {
        let live: Vec<RawDetection> = tracks.iter().map(|t| t.detection.clone()).collect();

        if let Some(overlay) = self.overlay.as_mut() {
            if let Err(e) = overlay.present(&live) {
                self.stats.output_errors += 1;
                tracing::warn!(error = %e, "Overlay update failed");
            }
        }

        if !self.pointer_enabled {
            return;
        }
        let (Some(pointer), Some((x, y))) = (self.pointer.as_mut(), self.targeter.target(&live))
        else {
            return;
        };
        match pointer.move_to(x, y) {
            Ok(()) => self.stats.pointer_moves += 1,
            Err(e) => {
                self.stats.output_errors += 1;
                tracing::warn!(x, y, error = %e, "Pointer move failed");
            }
        }
    }

    fn log_stats(&self) {
        tracing::info!(
            fps = self.stats.fps,
            live_tracks = self.stats.live_tracks,
            frames = self.stats.frames_processed,
            "Run statistics"
        );
    }
}

/// Tick period for an fps cap; `None` when unpaced.
fn frame_period(fps_limit: u32) -> Option<Duration> {
    (fps_limit > 0).then(|| Duration::from_nanos(1_000_000_000 / u64::from(fps_limit)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use steadybox_detection_model::geometry::BoxRect;

    use crate::replay::{FrameQueue, ReplayDetector};

    fn person(x1: i32, y1: i32, x2: i32, y2: i32) -> RawDetection {
        RawDetection::new(BoxRect::new(x1, y1, x2, y2), 0.9, 0, "person")
    }

    fn unpaced() -> AppConfig {
        let mut config = AppConfig::default();
        config.capture.fps_limit = 0;
        config
    }

    #[derive(Clone, Default)]
    struct Shared<T>(Arc<Mutex<Vec<T>>>);

    impl<T: Clone> Shared<T> {
        fn items(&self) -> Vec<T> {
            self.0.lock().unwrap().clone()
        }
    }

    impl OverlaySink for Shared<Vec<RawDetection>> {
        fn present(&mut self, detections: &[RawDetection]) -> SteadyboxResult<()> {
            self.0.lock().unwrap().push(detections.to_vec());
            Ok(())
        }
    }

    impl PointerDriver for Shared<(i32, i32)> {
        fn move_to(&mut self, x: i32, y: i32) -> SteadyboxResult<()> {
            self.0.lock().unwrap().push((x, y));
            Ok(())
        }
    }

    struct FlakyDetector {
        calls: u32,
    }

    impl Detector for FlakyDetector {
        fn detect(&mut self, _frame: &CapturedFrame) -> SteadyboxResult<Vec<RawDetection>> {
            self.calls += 1;
            if self.calls == 2 {
                return Err(SteadyboxError::detection("inference failed"));
            }
            Ok(vec![person(0, 0, 100, 200)])
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    struct StuckPointer;

    impl PointerDriver for StuckPointer {
        fn move_to(&mut self, _x: i32, _y: i32) -> SteadyboxResult<()> {
            Err(SteadyboxError::pointer("input injection denied"))
        }
    }

    struct BrokenSource;

    impl FrameSource for BrokenSource {
        fn next_frame(&mut self) -> SteadyboxResult<Option<CapturedFrame>> {
            Err(SteadyboxError::capture("display lost"))
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    #[tokio::test]
    async fn test_session_drives_overlay_and_pointer() {
        let overlay = Shared::<Vec<RawDetection>>::default();
        let pointer = Shared::<(i32, i32)>::default();
        let source = FrameQueue::from_detections(vec![
            vec![person(0, 0, 100, 200)],
            vec![person(0, 0, 100, 200)],
            vec![],
        ]);

        let mut session = MonitorSession::new(&unpaced(), Box::new(source), Box::new(ReplayDetector))
            .unwrap()
            .with_overlay(Box::new(overlay.clone()))
            .with_pointer(Box::new(pointer.clone()));

        let stats = session.run().await.unwrap();

        assert_eq!(session.state(), SessionState::Stopped);
        assert_eq!(stats.frames_processed, 3);
        assert_eq!(stats.tracks_created, 1);
        assert_eq!(stats.peak_live_tracks, 1);
        // life 2 decays to 0 on the empty frame
        assert_eq!(stats.live_tracks, 0);

        let frames = overlay.items();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0], vec![person(0, 0, 100, 200)]);
        assert!(frames[2].is_empty());

        // center x 50, top band y = 200 * 0.2 / 2 = 20
        assert_eq!(pointer.items(), vec![(50, 20), (50, 20)]);
        assert_eq!(stats.pointer_moves, 2);
    }

    #[tokio::test]
    async fn test_filter_runs_before_tracking() {
        let overlay = Shared::<Vec<RawDetection>>::default();
        let car = RawDetection::new(BoxRect::new(0, 0, 50, 50), 0.95, 2, "car");
        let faint = RawDetection::new(BoxRect::new(200, 0, 250, 50), 0.2, 0, "person");
        let source = FrameQueue::from_detections(vec![vec![car, faint, person(300, 0, 350, 50)]]);

        let mut session = MonitorSession::new(&unpaced(), Box::new(source), Box::new(ReplayDetector))
            .unwrap()
            .with_overlay(Box::new(overlay.clone()));
        let stats = session.run().await.unwrap();

        assert_eq!(stats.raw_detections, 3);
        assert_eq!(stats.kept_detections, 1);
        assert_eq!(overlay.items()[0], vec![person(300, 0, 350, 50)]);
    }

    #[tokio::test]
    async fn test_detection_error_skips_frame() {
        let source = FrameQueue::from_detections(vec![vec![], vec![], vec![]]);
        let mut session =
            MonitorSession::new(&unpaced(), Box::new(source), Box::new(FlakyDetector { calls: 0 }))
                .unwrap();

        let stats = session.run().await.unwrap();
        assert_eq!(stats.frames_processed, 2);
        assert_eq!(stats.frames_skipped, 1);
        assert_eq!(session.smoother().frames(), 2);
    }

    #[tokio::test]
    async fn test_pointer_failure_does_not_stop_session() {
        let overlay = Shared::<Vec<RawDetection>>::default();
        let source = FrameQueue::from_detections(vec![vec![person(0, 0, 10, 10)]; 3]);
        let mut session = MonitorSession::new(&unpaced(), Box::new(source), Box::new(ReplayDetector))
            .unwrap()
            .with_overlay(Box::new(overlay.clone()))
            .with_pointer(Box::new(StuckPointer));

        let stats = session.run().await.unwrap();
        assert_eq!(stats.frames_processed, 3);
        assert_eq!(stats.output_errors, 3);
        assert_eq!(stats.pointer_moves, 0);
        assert_eq!(overlay.items().len(), 3);
    }

    #[tokio::test]
    async fn test_source_error_ends_session() {
        let mut session =
            MonitorSession::new(&unpaced(), Box::new(BrokenSource), Box::new(ReplayDetector)).unwrap();

        assert!(session.run().await.is_err());
        assert_eq!(session.state(), SessionState::Error);
        assert!(session.run().await.is_err());
    }

    #[tokio::test]
    async fn test_stop_flag_halts_before_first_frame() {
        let source = FrameQueue::from_detections(vec![vec![person(0, 0, 10, 10)]; 10]);
        let mut session =
            MonitorSession::new(&unpaced(), Box::new(source), Box::new(ReplayDetector)).unwrap();

        session.stop_flag().store(true, Ordering::SeqCst);
        let stats = session.run().await.unwrap();
        assert_eq!(stats.frames_processed, 0);
    }

    #[tokio::test]
    async fn test_disabled_pointer_never_moves() {
        let pointer = Shared::<(i32, i32)>::default();
        let mut config = unpaced();
        config.pointer.enabled = false;
        let source = FrameQueue::from_detections(vec![vec![person(0, 0, 10, 10)]]);

        let mut session = MonitorSession::new(&config, Box::new(source), Box::new(ReplayDetector))
            .unwrap()
            .with_pointer(Box::new(pointer.clone()));
        session.run().await.unwrap();

        assert!(pointer.items().is_empty());
    }

    #[tokio::test]
    async fn test_paced_session_completes() {
        let mut config = AppConfig::default();
        config.capture.fps_limit = 200;
        let source = FrameQueue::from_detections(vec![vec![person(0, 0, 10, 10)]; 4]);

        let mut session =
            MonitorSession::new(&config, Box::new(source), Box::new(ReplayDetector)).unwrap();
        let stats = session.run().await.unwrap();

        assert_eq!(stats.frames_processed, 4);
        assert!(stats.elapsed_secs > 0.0);
    }

    #[tokio::test]
    async fn test_session_writes_track_stream() {
        let dir = std::env::temp_dir().join("steadybox_test_session_output");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("tracks.jsonl");

        let source = FrameQueue::from_detections(vec![vec![person(0, 0, 10, 10)], vec![]]);
        let mut session = MonitorSession::new(&unpaced(), Box::new(source), Box::new(ReplayDetector))
            .unwrap()
            .with_output(path.clone());
        session.run().await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let records = crate::writer::read_track_stream(&content).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].tracks.len(), 1);
        assert!(records[1].tracks.is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_frame_period() {
        assert_eq!(frame_period(0), None);
        assert_eq!(frame_period(30), Some(Duration::from_nanos(33_333_333)));
    }
}
