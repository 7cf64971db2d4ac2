//! Generate, store and validate WIB detector frames.
//!
//! A WIB frame is a fixed 117-word (468-byte) record carrying 256 packed
//! 12-bit channel samples from four COLDATA blocks, protected by per-block
//! checksums and a frame CRC-32.
//!
//! # Crate Structure
//!
//! - [`frame`]: Bit-exact layout, checksums, reader and writer
//! - [`generator`]: Synthetic frame generator
//! - [`check`]: Integrity validation and reports

/// Re-export frame types.
pub mod frame {
    pub use wibframe_frame::*;
}

/// Re-export generator types.
pub mod generator {
    pub use wibframe_gen::*;
}

/// Re-export validation types.
pub mod check {
    pub use wibframe_check::*;
}
