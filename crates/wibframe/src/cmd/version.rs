use wibframe_frame::{
    CrcKind, Encoding, CHANNELS_PER_FRAME, CRC32_POLYNOMIAL, FRAME_BYTES, FRAME_WORDS, NUM_BLOCKS,
};
use wibframe_gen::GeneratorConfig;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

const ENCODINGS: [Encoding; 5] = [
    Encoding::Binary,
    Encoding::Hex,
    Encoding::Octal,
    Encoding::Decimal,
    Encoding::HeaderTable,
];

pub fn run(args: VersionArgs) -> CliResult<i32> {
    println!("wibframe {}", env!("CARGO_PKG_VERSION"));
    if args.extended {
        for line in layout_lines() {
            println!("{line}");
        }
    }
    Ok(SUCCESS)
}

/// The frame layout and integrity checks this build reads and writes.
fn layout_lines() -> Vec<String> {
    let crcs = [CrcKind::Standard, CrcKind::BitSerial, CrcKind::StandardLegacy]
        .map(crc_description)
        .join(", ");
    let encodings = ENCODINGS
        .map(|encoding| format!("{} ({})", encoding.name(), encoding.code()))
        .join(", ");

    vec![
        format!("frame: {FRAME_WORDS} words, {FRAME_BYTES} bytes"),
        format!("channels: {CHANNELS_PER_FRAME} x 12 bits in {NUM_BLOCKS} blocks"),
        format!("layout version: {}", GeneratorConfig::default().version),
        "checksums: A (xor), B (negated sum)".to_string(),
        format!("crc: {crcs}; polynomial {CRC32_POLYNOMIAL:#010x}"),
        format!("encodings: {encodings}"),
        format!(
            "platform: {}-{}",
            std::env::consts::ARCH,
            std::env::consts::OS
        ),
    ]
}

fn crc_description(kind: CrcKind) -> &'static str {
    match kind {
        CrcKind::Standard => "standard (words 0-115)",
        CrcKind::BitSerial => "bit-serial (words 0-115)",
        CrcKind::StandardLegacy => "standard-legacy (words 0-114)",
    }
}
