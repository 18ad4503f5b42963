//! Bounds-checked reader over a store image.

use visits_core::constants::STRING_TERMINATOR;
use visits_core::errors::CodecError;

const USIZE_WIDTH: usize = std::mem::size_of::<usize>();

/// Sequential reader. Every read names the field it is decoding so a short
/// image reports exactly where it ran out.
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Take the next `n` bytes, or fail without consuming anything.
    pub fn read_bytes(&mut self, n: usize, field: &'static str) -> Result<&'a [u8], CodecError> {
        let end = match self.pos.checked_add(n) {
            Some(end) if end <= self.data.len() => end,
            _ => {
                return Err(CodecError::Truncated {
                    field,
                    offset: self.pos,
                    needed: n,
                })
            }
        };
        let data: &'a [u8] = self.data;
        let bytes = &data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N, field)?);
        Ok(out)
    }

    pub fn read_u32(&mut self, field: &'static str) -> Result<u32, CodecError> {
        self.read_array::<4>(field).map(u32::from_ne_bytes)
    }

    pub fn read_i64(&mut self, field: &'static str) -> Result<i64, CodecError> {
        self.read_array::<8>(field).map(i64::from_ne_bytes)
    }

    pub fn read_usize(&mut self, field: &'static str) -> Result<usize, CodecError> {
        self.read_array::<USIZE_WIDTH>(field).map(usize::from_ne_bytes)
    }

    /// Read a length-prefixed, NUL-terminated UTF-8 string.
    ///
    /// `len_field` names the prefix and `field` the payload. The terminator is
    /// stripped; anything before it is kept verbatim.
    pub fn read_cstr(
        &mut self,
        len_field: &'static str,
        field: &'static str,
    ) -> Result<String, CodecError> {
        let len = self.read_usize(len_field)?;
        let offset = self.pos;
        let bytes = self.read_bytes(len, field)?;
        let Some((&last, body)) = bytes.split_last() else {
            return Err(CodecError::MissingTerminator { field, offset });
        };
        if last != STRING_TERMINATOR {
            return Err(CodecError::MissingTerminator { field, offset });
        }
        std::str::from_utf8(body)
            .map(str::to_owned)
            .map_err(|_| CodecError::InvalidUtf8 { field, offset })
    }
}
