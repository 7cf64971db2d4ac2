use std::fmt;
use std::io;

use wibframe_frame::FrameError;
use wibframe_gen::GenError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound | io::ErrorKind::AlreadyExists => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::Open { path, source } => {
            io_error(&format!("{context}: {}", path.display()), source)
        }
        FrameError::ShortRead { .. } | FrameError::Misaligned { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        FrameError::InvalidArgument(_) => CliError::new(USAGE, format!("{context}: {err}")),
    }
}

pub fn gen_error(context: &str, err: GenError) -> CliError {
    match err {
        GenError::Frame(err) => frame_error(context, err),
        GenError::Open { path, source } => {
            io_error(&format!("{context}: {}", path.display()), source)
        }
        GenError::InvalidConfig(_) => CliError::new(USAGE, format!("{context}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn data_errors_map_to_data_invalid() {
        let err = frame_error(
            "load failed",
            FrameError::Misaligned {
                len: 500,
                frame_bytes: 468,
            },
        );
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.message.starts_with("load failed: "));
    }

    #[test]
    fn open_errors_name_the_path() {
        let err = gen_error(
            "generate failed",
            GenError::Open {
                path: PathBuf::from("nowhere/test0.frame"),
                source: io::ErrorKind::NotFound.into(),
            },
        );
        assert_eq!(err.code, FAILURE);
        assert!(err.message.contains("nowhere/test0.frame"));
    }

    #[test]
    fn bad_config_is_a_usage_error() {
        let err = gen_error(
            "generate failed",
            GenError::InvalidConfig("err_prob".to_string()),
        );
        assert_eq!(err.code, USAGE);
    }
}
