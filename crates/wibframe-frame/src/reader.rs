use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

use crate::codec::decode_frame;
use crate::error::{FrameError, Result};
use crate::layout::{Frame, FRAME_BYTES};

/// Loads frames by index from any seekable byte source.
///
/// Every load seeks to `index * FRAME_BYTES` first, so the result never
/// depends on where a previous operation left the cursor.
pub struct FrameReader<T> {
    inner: T,
}

impl FrameReader<File> {
    /// Open a frame file for reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| FrameError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(file))
    }
}

impl<T: Read + Seek> FrameReader<T> {
    /// Wrap a seekable source.
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Total length of the source in bytes.
    pub fn byte_len(&mut self) -> Result<u64> {
        Ok(self.inner.seek(SeekFrom::End(0))?)
    }

    /// Number of whole frames in the source.
    ///
    /// Fails with [`FrameError::Misaligned`] when the length is not a
    /// multiple of the frame size.
    pub fn frame_count(&mut self) -> Result<u64> {
        let len = self.byte_len()?;
        if len % FRAME_BYTES as u64 != 0 {
            return Err(FrameError::Misaligned {
                len,
                frame_bytes: FRAME_BYTES,
            });
        }
        Ok(len / FRAME_BYTES as u64)
    }

    /// Load frame number `index` (counting from 0).
    pub fn load(&mut self, index: u64) -> Result<Frame> {
        let frame_bytes = FRAME_BYTES as u64;
        let start = index.saturating_mul(frame_bytes);
        let needed = start.saturating_add(frame_bytes);
        let available = self.byte_len()?;
        if available < needed {
            return Err(FrameError::ShortRead {
                index,
                needed,
                available,
            });
        }

        self.inner.seek(SeekFrom::Start(start))?;
        let mut buf = [0u8; FRAME_BYTES];
        match self.inner.read_exact(&mut buf) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => {
                return Err(FrameError::ShortRead {
                    index,
                    needed,
                    available,
                })
            }
            Err(err) => return Err(FrameError::Io(err)),
        }

        tracing::trace!(index, "loaded frame");
        decode_frame(&buf)
    }

    /// Borrow the underlying source.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying source.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner source.
    pub fn into_inner(self) -> T {
        self.inner
    }
}
