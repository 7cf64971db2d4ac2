use std::path::{Path, PathBuf};

use serde::Serialize;
use wibframe_check::{check_files, CheckConfig, FileReport};
use wibframe_gen::FileNaming;

use crate::cmd::CheckArgs;
use crate::exit::{CliResult, DATA_INVALID, FAILURE, SUCCESS};
use crate::output::{new_table, print_json, OutputFormat};

#[derive(Serialize)]
struct CheckOutput<'a> {
    valid: bool,
    files: &'a [FileReport],
}

pub fn run(args: CheckArgs, format: OutputFormat) -> CliResult<i32> {
    let naming = FileNaming {
        dir: args.dir.clone(),
        prefix: String::new(),
        suffix: args.suffix.clone(),
        extension: args.extension.clone(),
    };
    let paths: Vec<PathBuf> = args
        .paths
        .iter()
        .map(|path| resolve(&naming, path))
        .collect();
    let config = CheckConfig {
        crc: args.crc.into(),
        fail_fast: args.fail_fast,
    };

    let reports = check_files(paths, &config);
    let valid = reports.iter().all(FileReport::is_valid);
    print_check(
        &CheckOutput {
            valid,
            files: &reports,
        },
        format,
    );

    let integrity_failure = reports
        .iter()
        .any(|report| report.batch.as_ref().is_some_and(|batch| !batch.is_valid()));
    if integrity_failure {
        Ok(DATA_INVALID)
    } else if !valid {
        Ok(FAILURE)
    } else {
        Ok(SUCCESS)
    }
}

fn resolve(naming: &FileNaming, path: &Path) -> PathBuf {
    if path.is_file() {
        return path.to_path_buf();
    }
    match path.to_str().and_then(|name| naming.resolve(name)) {
        Some(resolved) => {
            tracing::debug!(
                name = %path.display(),
                path = %resolved.display(),
                "resolved frame name"
            );
            resolved
        }
        None => path.to_path_buf(),
    }
}

fn print_check(out: &CheckOutput<'_>, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            let mut table = new_table(vec!["FILE", "FRAME", "SEVERITY", "FINDING"]);
            for report in out.files {
                let file = report.path.display().to_string();
                if let Some(error) = &report.error {
                    table.add_row(vec![
                        file.clone(),
                        "-".to_string(),
                        "error".to_string(),
                        error.clone(),
                    ]);
                }
                if let Some(batch) = report.batch.as_ref().filter(|b| b.trailing_bytes != 0) {
                    table.add_row(vec![
                        file.clone(),
                        "-".to_string(),
                        "error".to_string(),
                        trailing_message(batch.trailing_bytes),
                    ]);
                }
                for finding in report.batch.iter().flat_map(|batch| &batch.failures) {
                    let frame = finding.index.to_string();
                    for error in &finding.report.errors {
                        table.add_row(vec![
                            file.clone(),
                            frame.clone(),
                            "error".to_string(),
                            error.to_string(),
                        ]);
                    }
                    for warning in &finding.report.warnings {
                        table.add_row(vec![
                            file.clone(),
                            frame.clone(),
                            "warning".to_string(),
                            warning.to_string(),
                        ]);
                    }
                }
            }
            println!("{table}");
            print_summary(out);
        }
        OutputFormat::Pretty => {
            for report in out.files {
                let path = report.path.display();
                match (&report.batch, &report.error) {
                    (_, Some(error)) => println!("{path}: unreadable: {error}"),
                    (Some(batch), None) => {
                        println!(
                            "{path}: {} frames, {} invalid, {} warnings{}",
                            batch.frames_checked,
                            batch.invalid_frames(),
                            batch.warning_count(),
                            if batch.stopped_early { " (stopped early)" } else { "" }
                        );
                        if batch.trailing_bytes != 0 {
                            println!("  error: {}", trailing_message(batch.trailing_bytes));
                        }
                        for finding in &batch.failures {
                            for error in &finding.report.errors {
                                println!("  frame {}: error: {error}", finding.index);
                            }
                            for warning in &finding.report.warnings {
                                println!("  frame {}: warning: {warning}", finding.index);
                            }
                        }
                    }
                    (None, None) => println!("{path}: not checked"),
                }
            }
            print_summary(out);
        }
        OutputFormat::Raw => {
            println!("{}", if out.valid { "valid" } else { "invalid" });
        }
    }
}

fn trailing_message(trailing_bytes: u64) -> String {
    format!("{trailing_bytes} bytes after the last whole frame")
}

fn print_summary(out: &CheckOutput<'_>) {
    let frames: u64 = out
        .files
        .iter()
        .filter_map(|report| report.batch.as_ref())
        .map(|batch| batch.frames_checked)
        .sum();
    if out.valid {
        println!("\n  Result: {frames} frames in {} file(s) passed", out.files.len());
    } else {
        println!("\n  Result: one or more frames failed");
    }
}
