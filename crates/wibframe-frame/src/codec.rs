use std::fmt;
use std::str::FromStr;

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{FrameError, Result};
use crate::layout::{Frame, FRAME_BYTES, FRAME_WORDS};

/// External representation of a stored frame.
///
/// Only [`Encoding::Binary`] can be loaded back; the text forms are for
/// inspection and for embedding frames in firmware test benches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// 468 little-endian bytes.
    #[default]
    Binary,
    /// One `0x%08x` line per word.
    Hex,
    /// One `0%011o` line per word.
    Octal,
    /// One `%010u` line per word.
    Decimal,
    /// A C header defining a `uint32_t` array of all written frames.
    HeaderTable,
}

impl Encoding {
    /// Parse a single-letter option code (`b`, `h`, `o`, `d`, `f`).
    pub fn from_code(code: char) -> Result<Self> {
        match code {
            'b' => Ok(Self::Binary),
            'h' => Ok(Self::Hex),
            'o' => Ok(Self::Octal),
            'd' => Ok(Self::Decimal),
            'f' => Ok(Self::HeaderTable),
            other => Err(FrameError::InvalidArgument(format!(
                "unknown encoding '{other}' (expected one of b, h, o, d, f)"
            ))),
        }
    }

    /// The single-letter option code.
    pub fn code(self) -> char {
        match self {
            Self::Binary => 'b',
            Self::Hex => 'h',
            Self::Octal => 'o',
            Self::Decimal => 'd',
            Self::HeaderTable => 'f',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Hex => "hex",
            Self::Octal => "octal",
            Self::Decimal => "decimal",
            Self::HeaderTable => "header",
        }
    }

    /// True for the encodings that [`decode_frame`] understands.
    pub fn is_binary(self) -> bool {
        matches!(self, Self::Binary)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "binary" => Ok(Self::Binary),
            "hex" => Ok(Self::Hex),
            "octal" => Ok(Self::Octal),
            "decimal" => Ok(Self::Decimal),
            "header" => Ok(Self::HeaderTable),
            _ => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(code), None) => Self::from_code(code),
                    _ => Err(FrameError::InvalidArgument(format!("unknown encoding '{s}'"))),
                }
            }
        }
    }
}

/// Encode a frame into its binary wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────┬──────────────────────┬──────────────┐
/// │ Header       │ 4 x COLDATA block    │ CRC-32       │
/// │ words 0..4   │ words 4..116         │ word 116     │
/// └──────────────┴──────────────────────┴──────────────┘
/// ```
/// Every word is written as 4 little-endian bytes.
pub fn encode_frame(frame: &Frame, dst: &mut BytesMut) {
    dst.reserve(FRAME_BYTES);
    for word in frame.as_words() {
        dst.put_u32_le(*word);
    }
}

/// Decode one frame from the start of `src`.
///
/// Bytes past the first frame are ignored. A buffer shorter than one frame
/// fails with [`FrameError::ShortRead`].
pub fn decode_frame(mut src: &[u8]) -> Result<Frame> {
    if src.len() < FRAME_BYTES {
        return Err(FrameError::ShortRead {
            index: 0,
            needed: FRAME_BYTES as u64,
            available: src.len() as u64,
        });
    }

    let mut words = [0u32; FRAME_WORDS];
    for word in words.iter_mut() {
        *word = src.get_u32_le();
    }
    Ok(Frame::from_words(words))
}
