//! Clock and pacing utilities for the monitor loop.
//!
//! A monitor session is anchored to a monotonic epoch taken when the
//! loop starts. This module provides:
//! - The session epoch and elapsed-time helpers
//! - A tick gate for periodic work (statistics logging)
//! - A frames-per-second meter

use std::time::Instant;

/// A session clock that provides monotonic timestamps relative to
/// a fixed epoch (the moment the session started).
#[derive(Debug, Clone)]
pub struct SessionClock {
    /// The instant the session started.
    epoch: Instant,

    /// Wall-clock time at epoch (RFC 3339 string).
    epoch_wall: String,
}

impl SessionClock {
    /// Create a new session clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Get nanoseconds elapsed since session start.
    pub fn elapsed_ns(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }

    /// Get seconds elapsed since session start.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Wall-clock time at session start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }

    /// Convert an elapsed nanosecond value to seconds.
    pub fn ns_to_secs(ns: u64) -> f64 {
        ns as f64 / 1_000_000_000.0
    }

    /// Convert seconds to nanoseconds.
    pub fn secs_to_ns(secs: f64) -> u64 {
        (secs * 1_000_000_000.0) as u64
    }
}

/// Tick gate for periodic work.
#[derive(Debug)]
pub struct RateController {
    target_interval_ns: u64,
    last_tick_ns: Option<u64>,
}

impl RateController {
    /// Create a controller targeting the given Hz rate.
    pub fn new(target_hz: u32) -> Self {
        Self::with_interval_ns(1_000_000_000 / target_hz.max(1) as u64)
    }

    /// Create a controller with an explicit interval.
    pub fn with_interval_ns(interval_ns: u64) -> Self {
        Self {
            target_interval_ns: interval_ns,
            last_tick_ns: None,
        }
    }

    /// Check if enough time has passed for the next tick.
    /// Returns true and updates internal state if ready.
    /// The first call always returns true.
    pub fn should_tick(&mut self, current_ns: u64) -> bool {
        match self.last_tick_ns {
            None => {
                self.last_tick_ns = Some(current_ns);
                true
            }
            Some(last) if current_ns >= last + self.target_interval_ns => {
                self.last_tick_ns = Some(current_ns);
                true
            }
            _ => false,
        }
    }

    /// Target interval in nanoseconds.
    pub fn interval_ns(&self) -> u64 {
        self.target_interval_ns
    }
}

/// Frames-per-second meter.
///
/// Counts frames and refreshes the reported rate once at least one second
/// has elapsed since the current window opened.
#[derive(Debug, Default)]
pub struct FpsMeter {
    window_start_ns: Option<u64>,
    frames_in_window: u64,
    fps: f64,
}

impl FpsMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one processed frame at `current_ns`.
    pub fn record(&mut self, current_ns: u64) {
        let start = *self.window_start_ns.get_or_insert(current_ns);
        self.frames_in_window += 1;

        let elapsed_ns = current_ns.saturating_sub(start);
        if elapsed_ns >= 1_000_000_000 {
            self.fps = self.frames_in_window as f64 / SessionClock::ns_to_secs(elapsed_ns);
            self.frames_in_window = 0;
            self.window_start_ns = Some(current_ns);
        }
    }

    /// Rate measured over the last completed window.
    pub fn fps(&self) -> f64 {
        self.fps
    }
}
