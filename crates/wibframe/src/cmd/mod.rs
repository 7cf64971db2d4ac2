use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use wibframe_frame::{CrcKind, Encoding};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod check;
pub mod dump;
pub mod generate;
pub mod inspect;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate synthetic frames.
    Generate(GenerateArgs),
    /// Validate checksums and CRCs of frame files.
    Check(CheckArgs),
    /// Write one stored frame to stdout in another encoding.
    Dump(DumpArgs),
    /// Show the decoded fields and channel grids of one frame.
    Inspect(InspectArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Generate(args) => generate::run(args, format),
        Command::Check(args) => check::run(args, format),
        Command::Dump(args) => dump::run(args),
        Command::Inspect(args) => inspect::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum CrcArg {
    Standard,
    BitSerial,
    /// Standard CRC ending at word 114, as older captures carry it.
    StandardLegacy,
}

impl From<CrcArg> for CrcKind {
    fn from(arg: CrcArg) -> Self {
        match arg {
            CrcArg::Standard => CrcKind::Standard,
            CrcArg::BitSerial => CrcKind::BitSerial,
            CrcArg::StandardLegacy => CrcKind::StandardLegacy,
        }
    }
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Number of frames.
    #[arg(long, short = 'n', default_value_t = 1)]
    pub count: u64,
    /// Output directory.
    #[arg(long, default_value = "exampleframes")]
    pub dir: PathBuf,
    /// Create the output directory if it does not exist.
    #[arg(long)]
    pub create_dir: bool,
    /// File name prefix.
    #[arg(long, default_value = "test")]
    pub prefix: String,
    /// File name suffix, after the frame number.
    #[arg(long, default_value = "")]
    pub suffix: String,
    /// File extension, including the dot.
    #[arg(long, default_value = ".frame")]
    pub extension: String,
    /// Write every frame into one file instead of one file per frame.
    #[arg(long)]
    pub single_file: bool,
    /// Output encoding: binary, hex, octal, decimal, header (or b, h, o, d, f).
    #[arg(long, short = 'e', default_value = "binary")]
    pub encoding: Encoding,
    /// Symbol prefix for the header encoding.
    #[arg(long, default_value = "WIB")]
    pub symbol: String,
    /// Mean channel value.
    #[arg(long, default_value_t = 250)]
    pub pedestal: u16,
    /// Noise half-width.
    #[arg(long, default_value_t = 10)]
    pub amplitude: u16,
    /// Probability of each error flag being raised.
    #[arg(long, default_value_t = 1e-5)]
    pub err_prob: f64,
    /// RNG seed for reproducible output.
    #[arg(long, env = "WIBFRAME_SEED")]
    pub seed: Option<u64>,
    /// Timestamp increment between frames.
    #[arg(long, default_value_t = 500)]
    pub tick: u64,
    /// Timestamp of the first frame. Default: current time in nanoseconds.
    #[arg(long)]
    pub start_timestamp: Option<u64>,
    /// CRC flavour stamped into the trailer.
    #[arg(long, value_enum, default_value = "standard")]
    pub crc: CrcArg,
    /// Fixed fiber number (needs --slot and --crate).
    #[arg(long, requires_all = ["slot", "crate_no"])]
    pub fiber: Option<u8>,
    /// Fixed slot number (needs --fiber and --crate).
    #[arg(long, requires_all = ["fiber", "crate_no"])]
    pub slot: Option<u8>,
    /// Fixed crate number (needs --fiber and --slot).
    #[arg(long = "crate", requires_all = ["fiber", "slot"])]
    pub crate_no: Option<u8>,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Frame files. Names that do not exist are also looked up under --dir
    /// with --suffix and --extension.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
    /// CRC flavour the trailer is expected to hold.
    #[arg(long, value_enum, default_value = "standard")]
    pub crc: CrcArg,
    /// Stop at the first hard error.
    #[arg(long)]
    pub fail_fast: bool,
    /// Directory for name lookup.
    #[arg(long, default_value = "exampleframes")]
    pub dir: PathBuf,
    /// Suffix for name lookup.
    #[arg(long, default_value = "")]
    pub suffix: String,
    /// Extension for name lookup.
    #[arg(long, default_value = ".frame")]
    pub extension: String,
}

#[derive(Args, Debug)]
pub struct DumpArgs {
    /// Binary frame file.
    pub path: PathBuf,
    /// Frame number within the file.
    #[arg(long, default_value_t = 0)]
    pub index: u64,
    /// Output encoding.
    #[arg(long, short = 'e', default_value = "hex")]
    pub encoding: Encoding,
    /// Symbol prefix for the header encoding.
    #[arg(long, default_value = "WIB")]
    pub symbol: String,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Binary frame file.
    pub path: PathBuf,
    /// Frame number within the file.
    #[arg(long, default_value_t = 0)]
    pub index: u64,
    /// CRC flavour used for the validity line.
    #[arg(long, value_enum, default_value = "standard")]
    pub crc: CrcArg,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Also describe the frame layout, checks and encodings.
    #[arg(long)]
    pub extended: bool,
}
