use std::fmt;
use std::path::PathBuf;

use serde::{Serialize, Serializer};
use wibframe_frame::ChecksumKind;

/// A hard integrity failure. Any of these makes a frame invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IntegrityError {
    #[error("block {block} checksum {kind:?} mismatch")]
    ChecksumMismatch {
        block: usize,
        #[serde(serialize_with = "serialize_checksum_kind")]
        kind: ChecksumKind,
    },

    #[error("CRC mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    CrcMismatch { stored: u32, computed: u32 },
}

fn serialize_checksum_kind<S: Serializer>(
    kind: &ChecksumKind,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(match kind {
        ChecksumKind::A => "A",
        ChecksumKind::B => "B",
    })
}

/// A raised diagnostic flag. Reported, never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Warning {
    WibErrors { value: u16 },
    S1Error { block: usize, value: u8 },
    S2Error { block: usize, value: u8 },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WibErrors { value } => write!(f, "WIB error bits set ({value:#06x})"),
            Self::S1Error { block, value } => {
                write!(f, "block {block} S1 error bits set ({value:#x})")
            }
            Self::S2Error { block, value } => {
                write!(f, "block {block} S2 error bits set ({value:#x})")
            }
        }
    }
}

/// Findings for one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<IntegrityError>,
    pub warnings: Vec<Warning>,
}

impl ValidationReport {
    /// True when no hard error was found.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// True when nothing at all was found.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// The report of one frame within a stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameFinding {
    pub index: u64,
    #[serde(flatten)]
    pub report: ValidationReport,
}

/// Findings for every frame in one stream. Clean frames are counted but
/// not listed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub frames_checked: u64,
    pub failures: Vec<FrameFinding>,
    pub stopped_early: bool,
    /// Bytes after the last whole frame.
    pub trailing_bytes: u64,
}

impl BatchReport {
    /// True when the stream holds whole frames only and none had a hard
    /// error.
    pub fn is_valid(&self) -> bool {
        self.trailing_bytes == 0
            && self
                .failures
                .iter()
                .all(|finding| finding.report.is_valid())
    }

    /// Number of frames with at least one hard error.
    pub fn invalid_frames(&self) -> usize {
        self.failures
            .iter()
            .filter(|finding| !finding.report.is_valid())
            .count()
    }

    /// Total number of warnings over all frames.
    pub fn warning_count(&self) -> usize {
        self.failures
            .iter()
            .map(|finding| finding.report.warnings.len())
            .sum()
    }
}

/// Outcome for one file of a multi-file run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<BatchReport>,
    /// Why the file could not be checked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    /// True when the file was read completely and every frame is valid.
    pub fn is_valid(&self) -> bool {
        self.error.is_none() && self.batch.as_ref().is_some_and(BatchReport::is_valid)
    }
}
