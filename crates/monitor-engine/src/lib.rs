//! Steadybox Monitor Engine
//!
//! Runs the real-time loop around the tracker: frames come from a
//! [`FrameSource`](steadybox_platform_core::FrameSource), detections from a
//! [`Detector`](steadybox_platform_core::Detector), and smoothed tracks go
//! out to an overlay, the pointer, and optionally a JSONL track stream.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                   MonitorSession                     │
//! │  ┌────────┐  ┌──────────┐  ┌────────┐  ┌───────────┐ │
//! │  │ Frame  │─▶│ Detector │─▶│ Filter │─▶│ Detection │ │
//! │  │ Source │  │          │  │        │  │ Smoother  │ │
//! │  └────────┘  └──────────┘  └────────┘  └─────┬─────┘ │
//! │                        ┌───────────┬─────────┤       │
//! │                        ▼           ▼         ▼       │
//! │                   ┌─────────┐ ┌─────────┐ ┌────────┐ │
//! │                   │ Overlay │ │ Pointer │ │ Writer │ │
//! │                   └─────────┘ └─────────┘ └────────┘ │
//! └──────────────────────────────────────────────────────┘
//! ```

pub mod pointer;
pub mod replay;
pub mod session;
pub mod writer;

pub use pointer::PointerTargeter;
pub use replay::{FrameQueue, ReplayDetector, ReplaySource};
pub use session::*;
pub use writer::{read_track_stream, TrackFrameRecord, TrackStreamHeader, TrackWriter};
