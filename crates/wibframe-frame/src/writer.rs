use std::io::{ErrorKind, Write};

use bytes::{BufMut, BytesMut};

use crate::codec::{encode_frame, Encoding};
use crate::error::{FrameError, Result};
use crate::layout::{Frame, FRAME_WORDS};

const INITIAL_BUFFER_CAPACITY: usize = 4 * 1024;

/// Configuration for a [`FrameWriter`].
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Output representation. Default: binary.
    pub encoding: Encoding,
    /// Symbol prefix used by [`Encoding::HeaderTable`]. Default: `WIB`.
    pub symbol: String,
    /// Frame count declared in the [`Encoding::HeaderTable`] preamble.
    /// Default: 1.
    pub declared_frames: u64,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            encoding: Encoding::Binary,
            symbol: "WIB".to_string(),
            declared_frames: 1,
        }
    }
}

impl WriterConfig {
    /// Default configuration with the given encoding.
    pub fn with_encoding(encoding: Encoding) -> Self {
        Self {
            encoding,
            ..Self::default()
        }
    }
}

/// Writes complete frames to any `Write` sink in a chosen [`Encoding`].
///
/// Call [`FrameWriter::finish`] after the last frame; the header-table
/// encoding only closes its array there.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: WriterConfig,
    frames_written: u64,
    finished: bool,
}

impl<T: Write> FrameWriter<T> {
    /// Create a binary frame writer.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, WriterConfig::default())
    }

    /// Create a frame writer with explicit configuration.
    pub fn with_config(inner: T, config: WriterConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            frames_written: 0,
            finished: false,
        }
    }

    /// Append one frame.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        if self.finished {
            return Err(FrameError::InvalidArgument(
                "frame written after finish()".to_string(),
            ));
        }

        self.buf.clear();
        match self.config.encoding {
            Encoding::Binary => encode_frame(frame, &mut self.buf),
            Encoding::Hex => self.put_lines(frame, |w| format!("0x{w:08x}\n")),
            Encoding::Octal => self.put_lines(frame, |w| format!("0{w:011o}\n")),
            Encoding::Decimal => self.put_lines(frame, |w| format!("{w:010}\n")),
            Encoding::HeaderTable => self.put_table_rows(frame),
        }

        self.write_buf()?;
        self.frames_written += 1;
        self.flush()
    }

    /// Close the output. For the header-table encoding this writes the
    /// preamble (if no frame was written) and the array terminator.
    pub fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.buf.clear();
        if self.config.encoding == Encoding::HeaderTable {
            if self.frames_written == 0 {
                self.put_preamble();
            }
            self.buf.put_slice(b"\n};\n\n#endif");
        }
        self.write_buf()?;
        self.finished = true;
        self.flush()
    }

    fn put_lines(&mut self, frame: &Frame, line: impl Fn(u32) -> String) {
        for word in frame.as_words() {
            self.buf.put_slice(line(*word).as_bytes());
        }
    }

    fn put_preamble(&mut self) {
        let symbol = &self.config.symbol;
        let preamble = format!(
            "#ifndef {symbol}_FRAMES_H__\n#define {symbol}_FRAMES_H__\n\n\
             const uint32_t {symbol}_FRAMESIZE = {FRAME_WORDS}*4;\n\
             const uint32_t {symbol}_FRAMENUM = {};\n\n\
             uint32_t {symbol}_DATA[] = {{",
            self.config.declared_frames
        );
        self.buf.put_slice(preamble.as_bytes());
    }

    fn put_table_rows(&mut self, frame: &Frame) {
        if self.frames_written == 0 {
            self.put_preamble();
        } else {
            self.buf.put_u8(b',');
        }
        for (i, word) in frame.as_words().iter().enumerate() {
            if i > 0 {
                self.buf.put_u8(b',');
            }
            self.buf.put_slice(format!("\n    0x{word:08x}").as_bytes());
        }
    }

    fn write_buf(&mut self) -> Result<()> {
        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::Io(ErrorKind::WriteZero.into())),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        Ok(())
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Number of frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Borrow the underlying sink.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying sink.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner sink. Does not call
    /// [`FrameWriter::finish`].
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current writer configuration.
    pub fn config(&self) -> &WriterConfig {
        &self.config
    }
}
