use std::path::PathBuf;

use wibframe_frame::FrameError;

/// Errors that can occur while generating frames.
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    /// Encoding or writing a frame failed.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// An output file could not be created.
    #[error("failed to create {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The generator configuration is out of range.
    #[error("invalid generator config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, GenError>;
