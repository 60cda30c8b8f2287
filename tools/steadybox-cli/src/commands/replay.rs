//! Replay a recorded detection stream through the tracker.

use std::path::PathBuf;
use std::sync::atomic::Ordering;

use steadybox_common::config::{AppConfig, DecayPolicy, OverlayConfig};
use steadybox_common::error::SteadyboxResult;
use steadybox_detection_model::detection::RawDetection;
use steadybox_detection_model::filter::DetectionFilter;
use steadybox_detection_model::label::{class_color, label_text};
use steadybox_monitor_engine::{MonitorSession, ReplayDetector, ReplaySource};
use steadybox_platform_core::{OverlaySink, PointerDriver};

/// Tracker settings given on the command line.
#[derive(Debug, Default)]
pub struct TrackerOverrides {
    pub smoothing_factor: Option<f64>,
    pub history_size: Option<usize>,
    pub iou_threshold: Option<f64>,
    pub decay_policy: Option<DecayPolicy>,
}

impl TrackerOverrides {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(v) = self.smoothing_factor {
            config.tracker.smoothing_factor = v;
        }
        if let Some(v) = self.history_size {
            config.tracker.history_size = v;
        }
        if let Some(v) = self.iou_threshold {
            config.tracker.iou_match_threshold = v;
        }
        if let Some(v) = self.decay_policy {
            config.tracker.decay_policy = v;
        }
    }
}

/// Logs what an overlay window would draw.
struct LogOverlay {
    config: OverlayConfig,
}

impl OverlaySink for LogOverlay {
    fn present(&mut self, detections: &[RawDetection]) -> SteadyboxResult<()> {
        for d in detections {
            tracing::trace!(
                label = %label_text(d, &self.config),
                color = ?class_color(d.class_id),
                bbox = ?d.bbox.coords(),
                "Overlay box"
            );
        }
        Ok(())
    }
}

/// Logs pointer targets instead of moving the system cursor.
struct LogPointer;

impl PointerDriver for LogPointer {
    fn move_to(&mut self, x: i32, y: i32) -> SteadyboxResult<()> {
        tracing::trace!(x, y, "Pointer target");
        Ok(())
    }
}

pub async fn run(
    mut config: AppConfig,
    frames: PathBuf,
    output: Option<PathBuf>,
    fps: u32,
    overrides: TrackerOverrides,
    no_filter: bool,
) -> anyhow::Result<()> {
    overrides.apply(&mut config);
    config.capture.fps_limit = fps;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid tracker settings: {e}"))?;

    println!("Replaying: {}", frames.display());
    println!(
        "  Smoothing: factor {}, history {}, IOU threshold {}, decay {:?}",
        config.tracker.smoothing_factor,
        config.tracker.history_size,
        config.tracker.iou_match_threshold,
        config.tracker.decay_policy
    );
    if fps > 0 {
        println!("  Pace: {fps} fps");
    }

    let source = ReplaySource::open(&frames)?;
    let overlay = LogOverlay {
        config: config.overlay,
    };

    let mut session = MonitorSession::new(&config, Box::new(source), Box::new(ReplayDetector))?
        .with_overlay(Box::new(overlay))
        .with_pointer(Box::new(LogPointer));
    if no_filter {
        session = session.with_filter(DetectionFilter::pass_through());
    }
    if let Some(path) = &output {
        session = session.with_output(path.clone());
    }

    let stop = session.stop_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.store(true, Ordering::SeqCst);
        }
    });

    let stats = session.run().await?;

    println!();
    println!("Replay complete:");
    println!(
        "  Frames: {} processed, {} skipped",
        stats.frames_processed, stats.frames_skipped
    );
    println!(
        "  Detections: {} raw, {} kept",
        stats.raw_detections, stats.kept_detections
    );
    println!(
        "  Tracks: {} created, peak {} live, {} live at end",
        stats.tracks_created, stats.peak_live_tracks, stats.live_tracks
    );
    println!("  Rate: {:.1} fps", stats.average_fps());
    if let Some(path) = output {
        println!("  Tracks written to: {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_only_given_fields() {
        let mut config = AppConfig::default();
        TrackerOverrides {
            smoothing_factor: Some(0.8),
            decay_policy: Some(DecayPolicy::AnyUnmatched),
            ..TrackerOverrides::default()
        }
        .apply(&mut config);

        assert_eq!(config.tracker.smoothing_factor, 0.8);
        assert_eq!(config.tracker.decay_policy, DecayPolicy::AnyUnmatched);
        assert_eq!(config.tracker.history_size, 5);
        assert_eq!(config.tracker.iou_match_threshold, 0.5);
    }
}
