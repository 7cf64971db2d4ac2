use std::fs;

use serde::Serialize;
use wibframe_frame::WriterConfig;
use wibframe_gen::{FileNaming, FrameGenerator, GeneratorConfig, Identity};

use crate::cmd::GenerateArgs;
use crate::exit::{gen_error, io_error, CliResult, SUCCESS};
use crate::output::{new_table, print_json, OutputFormat};

#[derive(Serialize)]
struct GenerateOutput {
    frames: u64,
    encoding: &'static str,
    files: Vec<String>,
}

pub fn run(args: GenerateArgs, format: OutputFormat) -> CliResult<i32> {
    let naming = FileNaming {
        dir: args.dir.clone(),
        prefix: args.prefix.clone(),
        suffix: args.suffix.clone(),
        extension: args.extension.clone(),
    };
    let writer_config = WriterConfig {
        encoding: args.encoding,
        symbol: args.symbol.clone(),
        ..WriterConfig::default()
    };

    if args.create_dir {
        fs::create_dir_all(&naming.dir).map_err(|err| {
            io_error(
                &format!("failed creating {}", naming.dir.display()),
                err,
            )
        })?;
    }

    let mut generator = FrameGenerator::new(generator_config(&args))
        .map_err(|err| gen_error("invalid generator settings", err))?;

    let files = if args.single_file {
        let path = generator
            .generate_single_file(args.count, &naming, &writer_config)
            .map_err(|err| gen_error("generate failed", err))?;
        vec![path]
    } else {
        generator
            .generate_files(args.count, &naming, &writer_config)
            .map_err(|err| gen_error("generate failed", err))?
    };

    let out = GenerateOutput {
        frames: generator.frames_generated(),
        encoding: args.encoding.name(),
        files: files
            .iter()
            .map(|path| path.display().to_string())
            .collect(),
    };
    print_generate(&out, format);
    Ok(SUCCESS)
}

fn generator_config(args: &GenerateArgs) -> GeneratorConfig {
    let identity = match (args.fiber, args.slot, args.crate_no) {
        (Some(fiber_no), Some(slot_no), Some(crate_no)) => Some(Identity {
            fiber_no,
            slot_no,
            crate_no,
        }),
        _ => None,
    };
    GeneratorConfig {
        pedestal: args.pedestal,
        amplitude: args.amplitude,
        err_prob: args.err_prob,
        seed: args.seed,
        tick: args.tick,
        start_timestamp: args.start_timestamp,
        identity,
        crc: args.crc.into(),
        ..GeneratorConfig::default()
    }
}

fn print_generate(out: &GenerateOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            let mut table = new_table(vec!["FILE"]);
            for file in &out.files {
                table.add_row(vec![file.clone()]);
            }
            println!("{table}");
            println!("{} frames ({})", out.frames, out.encoding);
        }
        OutputFormat::Pretty => {
            println!(
                "generated {} frames in {} file(s), encoding={}",
                out.frames,
                out.files.len(),
                out.encoding
            );
        }
        OutputFormat::Raw => {
            for file in &out.files {
                println!("{file}");
            }
        }
    }
}
