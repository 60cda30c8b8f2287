//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{SteadyboxError, SteadyboxResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Detection smoothing / tracking parameters.
    pub tracker: TrackerConfig,

    /// Frame capture and loop pacing.
    pub capture: CaptureConfig,

    /// Detector settings and the pre-tracking filter.
    pub detector: DetectorConfig,

    /// Pointer automation.
    pub pointer: PointerConfig,

    /// Overlay label formatting.
    pub overlay: OverlayConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// When tracks that failed to match lose life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecayPolicy {
    /// Decay every track only on frames with no detections at all.
    /// Tracks that miss a frame containing other detections keep their life.
    #[default]
    EmptyFrameOnly,
    /// Decay every track that is unmatched in any frame.
    AnyUnmatched,
}

impl std::str::FromStr for DecayPolicy {
    type Err = SteadyboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "empty_frame_only" | "empty-frame-only" => Ok(Self::EmptyFrameOnly),
            "any_unmatched" | "any-unmatched" => Ok(Self::AnyUnmatched),
            other => Err(SteadyboxError::config(format!(
                "unknown decay policy '{other}' (expected empty-frame-only or any-unmatched)"
            ))),
        }
    }
}

/// Tracker parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// EMA weight of the newest box, in (0, 1]. 1.0 disables smoothing.
    pub smoothing_factor: f64,

    /// Number of smoothed boxes retained per track (>= 1).
    pub history_size: usize,

    /// Minimum IOU for a detection to continue an existing track, in (0, 1].
    pub iou_match_threshold: f64,

    /// Decay behavior for unmatched tracks.
    pub decay_policy: DecayPolicy,
}

/// Capture and loop pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Upper bound on processed frames per second. 0 means unpaced.
    pub fps_limit: u32,

    /// Region of the desktop to monitor. `None` means the primary monitor.
    pub region: Option<CaptureRegion>,

    /// How often the monitor loop logs run statistics.
    pub stats_interval_secs: u64,
}

/// A rectangular desktop region in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRegion {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

/// Detector settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Model weights handed to the external detector.
    pub model_path: String,

    /// Detections below this confidence are dropped before tracking.
    pub confidence_threshold: f64,

    /// IOU used by the detector's own non-maximum suppression.
    pub nms_iou_threshold: f64,

    /// Class ids to keep. `None` keeps every class.
    pub classes: Option<Vec<u32>>,
}

/// Pointer automation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerConfig {
    /// Whether the pointer follows the largest tracked object.
    pub enabled: bool,

    /// Fraction of the box height, measured from the top edge, whose
    /// midpoint becomes the pointer target.
    pub target_percent: f64,
}

/// Overlay label settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub show_confidence: bool,
    pub show_class_name: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "steadybox=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            smoothing_factor: 0.3,
            history_size: 5,
            iou_match_threshold: 0.5,
            decay_policy: DecayPolicy::EmptyFrameOnly,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            fps_limit: 30,
            region: None,
            stats_interval_secs: 5,
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: "yolo26n.pt".to_string(),
            confidence_threshold: 0.5,
            nms_iou_threshold: 0.45,
            classes: Some(vec![0]),
        }
    }
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            target_percent: 0.2,
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            show_confidence: true,
            show_class_name: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl TrackerConfig {
    /// Check every parameter against its documented range.
    pub fn validate(&self) -> SteadyboxResult<()> {
        validate_smoothing_factor(self.smoothing_factor)?;
        validate_history_size(self.history_size)?;
        validate_iou_match_threshold(self.iou_match_threshold)?;
        Ok(())
    }
}

pub fn validate_smoothing_factor(value: f64) -> SteadyboxResult<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(SteadyboxError::config(format!(
            "smoothing_factor must be in (0, 1], got {value}"
        )))
    }
}

pub fn validate_history_size(value: usize) -> SteadyboxResult<()> {
    if value >= 1 {
        Ok(())
    } else {
        Err(SteadyboxError::config("history_size must be at least 1"))
    }
}

pub fn validate_iou_match_threshold(value: f64) -> SteadyboxResult<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(SteadyboxError::config(format!(
            "iou_match_threshold must be in (0, 1], got {value}"
        )))
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load and validate config from an explicit path.
    pub fn load_from(path: &Path) -> SteadyboxResult<Self> {
        if !path.exists() {
            return Err(SteadyboxError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> SteadyboxResult<PathBuf> {
        let config_path = config_file_path();
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save config as pretty JSON at `path`.
    pub fn save_to(&self, path: &Path) -> SteadyboxResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Validate every section.
    pub fn validate(&self) -> SteadyboxResult<()> {
        self.tracker.validate()?;

        if !(0.0..=1.0).contains(&self.detector.confidence_threshold) {
            return Err(SteadyboxError::config(format!(
                "detector.confidence_threshold must be in [0, 1], got {}",
                self.detector.confidence_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.pointer.target_percent) {
            return Err(SteadyboxError::config(format!(
                "pointer.target_percent must be in [0, 1], got {}",
                self.pointer.target_percent
            )));
        }
        if let Some(region) = self.capture.region {
            if region.width == 0 || region.height == 0 {
                return Err(SteadyboxError::config(
                    "capture.region must have non-zero width and height",
                ));
            }
        }
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("steadybox").join("config.json")
}
