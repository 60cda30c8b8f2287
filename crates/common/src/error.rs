//! Error types shared across Steadybox crates.

use std::path::PathBuf;

/// Top-level error type for Steadybox operations.
#[derive(Debug, thiserror::Error)]
pub enum SteadyboxError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Capture error: {message}")]
    Capture { message: String },

    #[error("Detection error: {message}")]
    Detection { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Pointer error: {message}")]
    Pointer { message: String },

    #[error("Replay error at line {line}: {message}")]
    Replay { line: usize, message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using SteadyboxError.
pub type SteadyboxResult<T> = Result<T, SteadyboxError>;

impl SteadyboxError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture {
            message: msg.into(),
        }
    }

    pub fn detection(msg: impl Into<String>) -> Self {
        Self::Detection {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn pointer(msg: impl Into<String>) -> Self {
        Self::Pointer {
            message: msg.into(),
        }
    }

    pub fn replay(line: usize, msg: impl Into<String>) -> Self {
        Self::Replay {
            line,
            message: msg.into(),
        }
    }
}
