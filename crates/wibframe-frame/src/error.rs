use std::path::PathBuf;

/// Errors that can occur while loading, storing or addressing frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A frame file could not be opened or created.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The source holds fewer bytes than the requested frame needs.
    #[error("short read for frame {index} ({available} bytes available, {needed} needed)")]
    ShortRead {
        index: u64,
        needed: u64,
        available: u64,
    },

    /// The source length is not a whole number of frames.
    #[error("stream length {len} is not a multiple of the frame size ({frame_bytes} bytes)")]
    Misaligned { len: u64, frame_bytes: usize },

    /// A caller-supplied argument is out of range or unparseable.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, FrameError>;
