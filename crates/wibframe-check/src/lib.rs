//! Integrity validation for WIB frames.
//!
//! Checksum and CRC mismatches are hard errors. Raised WIB, S1 and S2
//! error flags are soft warnings and never make a frame invalid. By
//! default every finding is reported; [`CheckConfig::fail_fast`] stops at
//! the first hard error instead.

pub mod config;
pub mod error;
pub mod report;
pub mod validator;

pub use config::CheckConfig;
pub use error::{CheckError, Result};
pub use report::{
    BatchReport, FileReport, FrameFinding, IntegrityError, ValidationReport, Warning,
};
pub use validator::{check, check_file, check_files, check_stream};
