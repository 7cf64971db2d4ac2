//! Bit-exact model of a WIB frame and its byte codec.
//!
//! A frame is 117 little-endian 32-bit words (468 bytes):
//! - a 4-word header carrying routing fields, a timestamp and WIB error flags
//! - four 28-word COLDATA blocks, each with a 4-word block header and 24
//!   words of tightly packed 12-bit channel readings
//! - a trailing CRC-32 word
//!
//! Fields are accessed through explicit bit-range helpers over an owned word
//! buffer. Checksums are derived data and are only refreshed by an explicit
//! [`Frame::reset_checksums`] call.

pub mod bits;
pub mod checksum;
pub mod codec;
pub mod error;
pub mod layout;
pub mod reader;
pub mod writer;

pub use checksum::{ChecksumKind, CrcKind, CRC32_POLYNOMIAL};
pub use codec::{decode_frame, encode_frame, Encoding};
pub use error::{FrameError, Result};
pub use layout::{
    Frame, ADC_WORDS_PER_BLOCK, CHANNELS_PER_BLOCK, CHANNELS_PER_FRAME, CHANNELS_PER_STREAM,
    FRAME_BYTES, FRAME_WORDS, NUM_BLOCKS, STREAMS_PER_BLOCK,
};
pub use reader::FrameReader;
pub use writer::{FrameWriter, WriterConfig};
