use wibframe_frame::{FrameReader, FrameWriter, WriterConfig};

use crate::cmd::DumpArgs;
use crate::exit::{frame_error, CliResult, SUCCESS};

pub fn run(args: DumpArgs) -> CliResult<i32> {
    let mut reader =
        FrameReader::open(&args.path).map_err(|err| frame_error("open failed", err))?;
    let frame = reader
        .load(args.index)
        .map_err(|err| frame_error(&format!("cannot load frame {}", args.index), err))?;

    let config = WriterConfig {
        encoding: args.encoding,
        symbol: args.symbol,
        declared_frames: 1,
    };
    let stdout = std::io::stdout();
    let mut writer = FrameWriter::with_config(stdout.lock(), config);
    writer
        .write_frame(&frame)
        .and_then(|()| writer.finish())
        .map_err(|err| frame_error("write failed", err))?;

    Ok(SUCCESS)
}
