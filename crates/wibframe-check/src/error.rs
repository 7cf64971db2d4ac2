use wibframe_frame::FrameError;

/// Errors that stop a validation run before it produces a report.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// Reading or decoding the frame source failed.
    #[error(transparent)]
    Frame(#[from] FrameError),
}

pub type Result<T> = std::result::Result<T, CheckError>;
