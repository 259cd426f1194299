//! Error types shared by the decode, transform and orchestration layers

use thiserror::Error;

/// Everything the library can fail with.
#[derive(Debug, Error)]
pub enum VizError {
    /// Missing or invalid container magic, or an unparseable chunk layout.
    #[error("format error: {0}")]
    Format(String),

    /// FFT input length is not a power of two.
    #[error("invalid FFT length {0}: must be a non-zero power of two")]
    InvalidLength(usize),

    /// Byte source unreachable or answered with a non-success status.
    #[error("failed to load {source_id}: {message}")]
    Load { source_id: String, message: String },

    /// Work was abandoned because its owner went away.
    #[error("operation cancelled")]
    Cancelled,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl VizError {
    pub fn format(message: impl Into<String>) -> Self {
        VizError::Format(message.into())
    }

    pub fn load(source_id: impl Into<String>, message: impl Into<String>) -> Self {
        VizError::Load {
            source_id: source_id.into(),
            message: message.into(),
        }
    }
}

/// Convenience alias so callers can write `Result<T>` instead of `Result<T, VizError>`.
pub type Result<T> = std::result::Result<T, VizError>;
