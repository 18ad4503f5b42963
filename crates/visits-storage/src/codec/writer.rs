//! Append-only byte buffer for building a store image.

use visits_core::constants::STRING_TERMINATOR;

/// Growable output buffer. All integers are written in native byte order.
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_ne_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.buf.extend_from_slice(&value.to_ne_bytes());
    }

    pub fn write_usize(&mut self, value: usize) {
        self.buf.extend_from_slice(&value.to_ne_bytes());
    }

    /// Write a length-prefixed, NUL-terminated string.
    /// The length counts the terminator.
    pub fn write_cstr(&mut self, value: &str) {
        self.write_usize(value.len() + 1);
        self.buf.extend_from_slice(value.as_bytes());
        self.buf.push(STRING_TERMINATOR);
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}
