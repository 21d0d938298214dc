//! Shared binary cursor for index parsing
//!
//! All three format readers parse their index regions through
//! [`BinaryCursor`], a forward/seekable reader over an in-memory byte
//! slice. Short reads surface as typed [`CursorError::UnexpectedEof`]
//! values carrying the requested and remaining byte counts.

use thiserror::Error;

/// Cursor operation result type
pub type CursorResult<T> = Result<T, CursorError>;

/// Errors produced by [`BinaryCursor`] reads and seeks
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    /// Fewer bytes remain than the read requested
    #[error("unexpected end of data: requested {requested} bytes, {remaining} remain")]
    UnexpectedEof {
        /// Number of bytes the read asked for
        requested: usize,
        /// Number of bytes left in the backing slice
        remaining: usize,
    },

    /// A seek target lies beyond the end of the backing slice
    #[error("seek to {position} is beyond end of data ({len} bytes)")]
    SeekOutOfBounds {
        /// Requested absolute position
        position: usize,
        /// Length of the backing slice
        len: usize,
    },
}

/// Forward/seekable byte reader over a borrowed slice.
///
/// Provides fixed-length reads, little/big-endian integer reads, and
/// null-padded fixed-width string decoding. Fixed-width names decode as
/// Latin-1 (one byte, one char): the legacy formats use a single-byte
/// codepage and this keeps every name representable without a lossy
/// transcoding step.
#[derive(Debug, Clone)]
pub struct BinaryCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BinaryCursor<'a> {
    /// Create a cursor positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current absolute position in bytes.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of bytes left between the position and the end.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Whether the cursor has consumed the entire slice.
    pub fn is_at_end(&self) -> bool {
        self.pos == self.data.len()
    }

    /// Move to an absolute position.
    ///
    /// Seeking to the end (`position == len`) is allowed; past it is not.
    pub fn seek(&mut self, position: usize) -> CursorResult<()> {
        if position > self.data.len() {
            return Err(CursorError::SeekOutOfBounds {
                position,
                len: self.data.len(),
            });
        }
        self.pos = position;
        Ok(())
    }

    /// Look at the next byte without consuming it.
    pub fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    /// Read exactly `n` bytes, advancing the cursor.
    pub fn read_exact(&mut self, n: usize) -> CursorResult<&'a [u8]> {
        if self.remaining() < n {
            return Err(CursorError::UnexpectedEof {
                requested: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> CursorResult<u8> {
        Ok(self.read_exact(1)?[0])
    }

    /// Read a little-endian `u32`.
    pub fn read_u32_le(&mut self) -> CursorResult<u32> {
        let bytes = self.read_exact(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a little-endian `i32`.
    pub fn read_i32_le(&mut self) -> CursorResult<i32> {
        let bytes = self.read_exact(4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a big-endian `u32`.
    pub fn read_u32_be(&mut self) -> CursorResult<u32> {
        let bytes = self.read_exact(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a fixed-width null-padded string field of `n` bytes.
    ///
    /// Consumes all `n` bytes, truncates at the first NUL, and decodes the
    /// prefix as Latin-1. Bytes after the NUL are ignored padding.
    pub fn read_fixed_cstring(&mut self, n: usize) -> CursorResult<String> {
        let raw = self.read_exact(n)?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        Ok(raw[..end].iter().map(|&b| b as char).collect())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_advance_position() {
        let data = [0x50, 0x41, 0x43, 0x4B, 0x0C, 0x00, 0x00, 0x00];
        let mut cursor = BinaryCursor::new(&data);

        assert_eq!(cursor.read_exact(4).unwrap(), b"PACK");
        assert_eq!(cursor.position(), 4);
        assert_eq!(cursor.read_u32_le().unwrap(), 12);
        assert!(cursor.is_at_end());
    }

    #[test]
    fn short_read_reports_requested_and_remaining() {
        let mut cursor = BinaryCursor::new(&[1, 2, 3]);
        cursor.read_u8().unwrap();

        let err = cursor.read_u32_le().unwrap_err();
        assert_eq!(
            err,
            CursorError::UnexpectedEof {
                requested: 4,
                remaining: 2
            }
        );
        // A failed read must not move the cursor.
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn seek_to_end_is_allowed_past_end_is_not() {
        let mut cursor = BinaryCursor::new(&[0; 8]);
        cursor.seek(8).unwrap();
        assert!(cursor.is_at_end());

        let err = cursor.seek(9).unwrap_err();
        assert_eq!(err, CursorError::SeekOutOfBounds { position: 9, len: 8 });
    }

    #[test]
    fn fixed_cstring_truncates_at_first_nul() {
        let field = *b"maps/m1.bsp\0\0garbage";
        let mut cursor = BinaryCursor::new(&field);

        let name = cursor.read_fixed_cstring(field.len()).unwrap();
        assert_eq!(name, "maps/m1.bsp");
        // The whole field is consumed, padding included.
        assert!(cursor.is_at_end());
    }

    #[test]
    fn fixed_cstring_without_nul_uses_full_width() {
        let mut cursor = BinaryCursor::new(b"abcd");
        assert_eq!(cursor.read_fixed_cstring(4).unwrap(), "abcd");
    }

    #[test]
    fn fixed_cstring_decodes_high_bytes_as_latin1() {
        let mut cursor = BinaryCursor::new(&[b'n', 0xE9, b'e', 0, 0, 0]);
        assert_eq!(cursor.read_fixed_cstring(6).unwrap(), "née");
    }

    #[test]
    fn big_endian_read() {
        let mut cursor = BinaryCursor::new(&[0x00, 0x00, 0x01, 0x00]);
        assert_eq!(cursor.read_u32_be().unwrap(), 256);
    }
}
