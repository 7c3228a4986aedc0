//! Buffered character source for the scanner.
//!
//! [`Buffer`] exposes a random-access, peekable stream of bytes over an
//! underlying reader, growing its window on demand.  [`Utf8Buffer`] layers
//! UTF-8 decoding on top so the scanner sees whole characters instead of
//! raw bytes.  Position requests outside the buffered region pull further
//! chunks from the reader; requests past the end of the stream clamp
//! silently to end-of-stream.

use std::io::Read;

/// Windowed byte buffer over an input stream.
///
/// Supports two cases: the whole source already in memory
/// ([`Buffer::from_bytes`]), or a non-seekable stream (file, pipe, console)
/// read chunk by chunk ([`Buffer::from_reader`]), doubling the window
/// whenever it fills up.
pub struct Buffer {
    buf: Vec<u8>,
    /// Stream offset of the first byte in `buf`.
    buf_start: usize,
    /// Number of valid bytes in `buf`.
    buf_len: usize,
    /// Length of the input seen so far (grows while the stream is read).
    buf_pos: usize,
    file_len: usize,
    stream: Option<Box<dyn Read>>,
}

impl Buffer {
    /// End-of-stream sentinel (the EOT mark).
    pub const EOF: u32 = 3;

    const MIN_BUFFER_LENGTH: usize = 1024;

    /// Buffer over a non-seekable stream; the window starts at 1 KiB and
    /// doubles whenever a chunk refill finds it full.
    pub fn from_reader(stream: Box<dyn Read>) -> Self {
        Self {
            buf: vec![0; Self::MIN_BUFFER_LENGTH],
            buf_start: 0,
            buf_len: 0,
            buf_pos: 0,
            file_len: 0,
            stream: Some(stream),
        }
    }

    /// Buffer over an in-memory source; the window is the whole input.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let len = bytes.len();
        Self {
            buf: bytes,
            buf_start: 0,
            buf_len: len,
            buf_pos: 0,
            file_len: len,
            stream: None,
        }
    }

    /// Reads the next byte, refilling the window from the stream when it is
    /// exhausted.  Returns [`Buffer::EOF`] at end of stream; never fails.
    pub fn read(&mut self) -> u32 {
        if self.buf_pos >= self.buf_len && self.read_next_chunk() == 0 {
            return Self::EOF;
        }
        let b = self.buf[self.buf_pos];
        self.buf_pos += 1;
        u32::from(b)
    }

    /// Reads the next byte without consuming it.
    pub fn peek(&mut self) -> u32 {
        let cur = self.pos();
        let ch = self.read();
        self.set_pos(cur);
        ch
    }

    /// Absolute offset, from the start of the stream, of the next unread byte.
    pub fn pos(&self) -> usize {
        self.buf_start + self.buf_pos
    }

    /// Repositions the cursor at an absolute stream offset.
    ///
    /// Offsets beyond the buffered region pull further chunks from the
    /// stream until the target is in sight; if the stream ends first, the
    /// position clamps to end-of-stream.  Callers must not rely on any
    /// failure signal.
    pub fn set_pos(&mut self, value: usize) {
        if value >= self.file_len {
            // The wanted position is past the buffer and the stream is not
            // seekable, so read the stream until the position is in sight.
            while value >= self.file_len && self.read_next_chunk() > 0 {}
        }

        if value >= self.buf_start && value < self.buf_start + self.buf_len {
            self.buf_pos = value - self.buf_start;
        } else {
            self.buf_pos = self.file_len - self.buf_start;
        }
    }

    /// Returns the raw text in `[beg, end)` (byte offsets), preserving the
    /// cursor.  Bytes outside the stream are dropped.
    pub fn substring(&mut self, beg: usize, end: usize) -> String {
        let old = self.pos();
        self.set_pos(beg);
        let mut bytes = Vec::with_capacity(end.saturating_sub(beg));
        while self.pos() < end {
            let ch = self.read();
            if ch == Self::EOF {
                break;
            }
            bytes.push(ch as u8);
        }
        self.set_pos(old);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Pulls the next chunk of bytes from the stream, doubling the window
    /// if it is full.  Returns the number of bytes read (0 at end of
    /// stream; read errors count as end of stream).
    fn read_next_chunk(&mut self) -> usize {
        let Some(stream) = self.stream.as_mut() else {
            return 0;
        };
        if self.buf.len() == self.buf_len {
            // Growing input with no way to foresee the maximum length:
            // adapt the window size on demand.
            self.buf.resize(self.buf_len * 2, 0);
        }
        let read = stream.read(&mut self.buf[self.buf_len..]).unwrap_or(0);
        if read > 0 {
            self.buf_len += read;
            self.file_len = self.buf_len;
        }
        read
    }
}

/// UTF-8 decoding layer over [`Buffer`].
///
/// Accumulates continuation bytes into a single scalar value, so callers
/// receive whole characters.  Isolated continuation bytes are skipped
/// rather than reported; the first 127 code points pass through untouched.
pub struct Utf8Buffer {
    inner: Buffer,
}

impl Utf8Buffer {
    pub fn new(inner: Buffer) -> Self {
        Self { inner }
    }

    /// Reads and decodes the next character; [`Buffer::EOF`] at end of stream.
    pub fn read(&mut self) -> u32 {
        let mut ch = self.inner.read();
        // Resynchronize on a UTF-8 start byte (0xxxxxxx or 11xxxxxx).
        while ch >= 128 && (ch & 0xC0) != 0xC0 && ch != Buffer::EOF {
            ch = self.inner.read();
        }
        if ch < 128 || ch == Buffer::EOF {
            // ASCII and EOF need no decoding.
        } else if (ch & 0xF0) == 0xF0 {
            // 11110xxx 10xxxxxx 10xxxxxx 10xxxxxx
            let c1 = ch & 0x07;
            let c2 = self.inner.read() & 0x3F;
            let c3 = self.inner.read() & 0x3F;
            let c4 = self.inner.read() & 0x3F;
            ch = (((((c1 << 6) | c2) << 6) | c3) << 6) | c4;
        } else if (ch & 0xE0) == 0xE0 {
            // 1110xxxx 10xxxxxx 10xxxxxx
            let c1 = ch & 0x0F;
            let c2 = self.inner.read() & 0x3F;
            let c3 = self.inner.read() & 0x3F;
            ch = ((c1 << 6) | c2) << 6 | c3;
        } else if (ch & 0xC0) == 0xC0 {
            // 110xxxxx 10xxxxxx
            let c1 = ch & 0x1F;
            let c2 = self.inner.read() & 0x3F;
            ch = (c1 << 6) | c2;
        }
        ch
    }

    /// Decodes the next character without consuming it.
    pub fn peek(&mut self) -> u32 {
        let cur = self.pos();
        let ch = self.read();
        self.set_pos(cur);
        ch
    }

    pub fn pos(&self) -> usize {
        self.inner.pos()
    }

    pub fn set_pos(&mut self, value: usize) {
        self.inner.set_pos(value);
    }

    pub fn substring(&mut self, beg: usize, end: usize) -> String {
        self.inner.substring(beg, end)
    }
}
