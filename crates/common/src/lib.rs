//! Steadybox Common Utilities
//!
//! Shared infrastructure for all Steadybox crates:
//! - Error types and result aliases
//! - Clock and frame-pacing utilities for the monitor loop
//! - Tracing/logging initialization
//! - Configuration loading and validation

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
