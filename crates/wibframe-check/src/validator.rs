use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use wibframe_frame::{ChecksumKind, Frame, FrameReader, FRAME_BYTES, NUM_BLOCKS};

use crate::config::CheckConfig;
use crate::error::Result;
use crate::report::{
    BatchReport, FileReport, FrameFinding, IntegrityError, ValidationReport, Warning,
};

/// Validate one frame.
///
/// Both block checksums of every block are checked, then the trailer CRC.
/// With `fail_fast` the report ends at the first hard error; otherwise
/// every error and every raised flag is listed.
pub fn check(frame: &Frame, config: &CheckConfig) -> ValidationReport {
    let mut report = ValidationReport::default();

    for block in 0..NUM_BLOCKS {
        if frame.calculate_checksum_a(block, frame.checksum_a(block)) != 0 {
            report.errors.push(IntegrityError::ChecksumMismatch {
                block,
                kind: ChecksumKind::A,
            });
        }
        if frame.calculate_checksum_b(block, frame.checksum_b(block)) != 0 {
            report.errors.push(IntegrityError::ChecksumMismatch {
                block,
                kind: ChecksumKind::B,
            });
        }
        if config.fail_fast && !report.errors.is_empty() {
            return report;
        }
    }

    let stored = frame.crc32();
    if frame.crc(config.crc, stored) != 0 {
        report.errors.push(IntegrityError::CrcMismatch {
            stored,
            computed: frame.crc(config.crc, 0),
        });
        if config.fail_fast {
            return report;
        }
    }

    let wib_errors = frame.wib_errors();
    if wib_errors != 0 {
        report.warnings.push(Warning::WibErrors { value: wib_errors });
    }
    for block in 0..NUM_BLOCKS {
        let s1 = frame.s1_error(block);
        if s1 != 0 {
            report.warnings.push(Warning::S1Error { block, value: s1 });
        }
        let s2 = frame.s2_error(block);
        if s2 != 0 {
            report.warnings.push(Warning::S2Error { block, value: s2 });
        }
    }

    report
}

/// Validate every frame of a stream.
///
/// Only frames with findings are listed in the returned report. Bytes past
/// the last whole frame are counted in `trailing_bytes` and make the
/// stream invalid; the whole frames before them are still checked.
pub fn check_stream<T: Read + Seek>(
    reader: &mut FrameReader<T>,
    config: &CheckConfig,
) -> Result<BatchReport> {
    let len = reader.byte_len()?;
    let frame_count = len / FRAME_BYTES as u64;
    let mut batch = BatchReport {
        trailing_bytes: len % FRAME_BYTES as u64,
        ..BatchReport::default()
    };
    if batch.trailing_bytes != 0 {
        tracing::warn!(
            len,
            trailing_bytes = batch.trailing_bytes,
            "stream ends with a partial frame"
        );
    }

    for index in 0..frame_count {
        let frame = reader.load(index)?;
        let report = check(&frame, config);
        batch.frames_checked += 1;
        if report.is_clean() {
            continue;
        }

        for error in &report.errors {
            tracing::warn!(index, %error, "frame failed integrity check");
        }
        for warning in &report.warnings {
            tracing::info!(index, %warning, "frame error flag set");
        }

        let valid = report.is_valid();
        batch.failures.push(FrameFinding { index, report });
        if config.fail_fast && !valid {
            batch.stopped_early = index + 1 < frame_count;
            break;
        }
    }

    tracing::debug!(
        frames = batch.frames_checked,
        invalid = batch.invalid_frames(),
        "checked frame stream"
    );
    Ok(batch)
}

/// Validate every frame of the file at `path`.
pub fn check_file(path: impl AsRef<Path>, config: &CheckConfig) -> Result<BatchReport> {
    let path = path.as_ref();
    let mut reader = FrameReader::open(path)?;
    let batch = check_stream(&mut reader, config)?;
    tracing::debug!(path = %path.display(), valid = batch.is_valid(), "checked frame file");
    Ok(batch)
}

/// Validate several files, producing one report per file.
///
/// A file that cannot be opened or read is recorded with its error and the
/// run continues, unless `fail_fast` is set, in which case the run ends at
/// the first file that is unreadable or holds an invalid frame.
pub fn check_files<I, P>(paths: I, config: &CheckConfig) -> Vec<FileReport>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    let mut reports = Vec::new();
    for path in paths {
        let path = path.into();
        let report = match check_file(&path, config) {
            Ok(batch) => FileReport {
                path,
                batch: Some(batch),
                error: None,
            },
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "cannot check frame file");
                FileReport {
                    path,
                    batch: None,
                    error: Some(err.to_string()),
                }
            }
        };
        let valid = report.is_valid();
        reports.push(report);
        if config.fail_fast && !valid {
            break;
        }
    }
    reports
}
