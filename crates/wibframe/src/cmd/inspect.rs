use serde::Serialize;
use wibframe_check::{check, CheckConfig};
use wibframe_frame::layout::HDR_NIBBLES;
use wibframe_frame::{Frame, FrameReader, CHANNELS_PER_STREAM, NUM_BLOCKS, STREAMS_PER_BLOCK};

use crate::cmd::InspectArgs;
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{new_table, print_json, OutputFormat};

#[derive(Serialize)]
struct BlockSummary {
    block: usize,
    s1_error: u8,
    s2_error: u8,
    checksum_a: u16,
    checksum_b: u16,
    convert_count: u16,
    error_register: u16,
    hdr: Vec<u8>,
    /// One row per stream, one column per channel.
    channels: Vec<Vec<u16>>,
}

#[derive(Serialize)]
struct FrameSummary {
    index: u64,
    sof: u8,
    version: u8,
    fiber_no: u8,
    slot_no: u8,
    crate_no: u8,
    mm: bool,
    oos: bool,
    wib_errors: u16,
    z: bool,
    timestamp: u64,
    wib_counter: u16,
    crc32: String,
    valid: bool,
    blocks: Vec<BlockSummary>,
}

pub fn run(args: InspectArgs, format: OutputFormat) -> CliResult<i32> {
    let mut reader =
        FrameReader::open(&args.path).map_err(|err| frame_error("open failed", err))?;
    let frame = reader
        .load(args.index)
        .map_err(|err| frame_error(&format!("cannot load frame {}", args.index), err))?;

    let config = CheckConfig {
        crc: args.crc.into(),
        ..CheckConfig::default()
    };
    let summary = summarize(&frame, args.index, check(&frame, &config).is_valid());
    print_summary(&summary, format);
    Ok(SUCCESS)
}

fn summarize(frame: &Frame, index: u64, valid: bool) -> FrameSummary {
    let blocks = (0..NUM_BLOCKS)
        .map(|block| BlockSummary {
            block,
            s1_error: frame.s1_error(block),
            s2_error: frame.s2_error(block),
            checksum_a: frame.checksum_a(block),
            checksum_b: frame.checksum_b(block),
            convert_count: frame.coldata_convert_count(block),
            error_register: frame.error_register(block),
            hdr: (0..HDR_NIBBLES).map(|n| frame.hdr(block, n)).collect(),
            channels: (0..STREAMS_PER_BLOCK)
                .map(|adc| {
                    (0..CHANNELS_PER_STREAM)
                        .map(|ch| frame.channel(block, adc, ch))
                        .collect()
                })
                .collect(),
        })
        .collect();

    FrameSummary {
        index,
        sof: frame.sof(),
        version: frame.version(),
        fiber_no: frame.fiber_no(),
        slot_no: frame.slot_no(),
        crate_no: frame.crate_no(),
        mm: frame.mm(),
        oos: frame.oos(),
        wib_errors: frame.wib_errors(),
        z: frame.z(),
        timestamp: frame.timestamp(),
        wib_counter: frame.wib_counter(),
        crc32: format!("{:#010x}", frame.crc32()),
        valid,
        blocks,
    }
}

fn header_rows(s: &FrameSummary) -> Vec<(&'static str, String)> {
    vec![
        ("sof", s.sof.to_string()),
        ("version", s.version.to_string()),
        ("fiber_no", s.fiber_no.to_string()),
        ("slot_no", s.slot_no.to_string()),
        ("crate_no", s.crate_no.to_string()),
        ("mm", s.mm.to_string()),
        ("oos", s.oos.to_string()),
        ("wib_errors", format!("{:#06x}", s.wib_errors)),
        ("z", s.z.to_string()),
        ("timestamp", s.timestamp.to_string()),
        ("wib_counter", s.wib_counter.to_string()),
        ("crc32", s.crc32.clone()),
        ("valid", s.valid.to_string()),
    ]
}

fn block_line(b: &BlockSummary) -> String {
    let hdr: Vec<String> = b.hdr.iter().map(|n| format!("{n:x}")).collect();
    format!(
        "block {}: s1={} s2={} checksum_a={:#06x} checksum_b={:#06x} convert_count={} error_register={:#06x} hdr={}",
        b.block,
        b.s1_error,
        b.s2_error,
        b.checksum_a,
        b.checksum_b,
        b.convert_count,
        b.error_register,
        hdr.join("")
    )
}

fn print_summary(s: &FrameSummary, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(s),
        OutputFormat::Table => {
            let mut table = new_table(vec!["FIELD", "VALUE"]);
            for (name, value) in header_rows(s) {
                table.add_row(vec![name.to_string(), value]);
            }
            println!("frame {}\n{table}", s.index);

            for block in &s.blocks {
                println!("\n{}", block_line(block));
                let mut header = vec!["ADC".to_string()];
                header.extend((0..CHANNELS_PER_STREAM).map(|ch| format!("CH{ch}")));
                let mut grid = new_table(header);
                for (adc, row) in block.channels.iter().enumerate() {
                    let mut cells = vec![adc.to_string()];
                    cells.extend(row.iter().map(u16::to_string));
                    grid.add_row(cells);
                }
                println!("{grid}");
            }
        }
        OutputFormat::Pretty => {
            println!("frame {}", s.index);
            for (name, value) in header_rows(s) {
                println!("  {name:<12} {value}");
            }
            for block in &s.blocks {
                println!("{}", block_line(block));
                for row in &block.channels {
                    let cells: Vec<String> = row.iter().map(|v| format!("{v:>4}")).collect();
                    println!("  {}", cells.join(" "));
                }
            }
        }
        OutputFormat::Raw => {
            let cells: Vec<String> = s
                .blocks
                .iter()
                .flat_map(|block| block.channels.iter().flatten())
                .map(u16::to_string)
                .collect();
            println!("{}", cells.join(" "));
        }
    }
}
