//! Positioned byte cursor with the primitive reads the binary formats need
//!
//! Fixed-width little/big-endian integers, null-terminated byte-run strings
//! and LEB128 variable-length integers, all over a borrowed byte slice with
//! an internal position. Reads past the end of the buffer surface as
//! `MalformedBinary` rather than panicking.

use crate::domain::ListingError;

/// LEB128 groups are capped at 6 bytes (42 payload bits); the formats
/// decoded here never encode wider values, and the cap bounds malicious
/// input.
const LEB128_MAX_BYTES: usize = 6;

#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[must_use]
    pub fn is_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    fn take(&mut self, n: usize, what: &str) -> Result<&'a [u8], ListingError> {
        let available = self.remaining();
        if n > available {
            return Err(ListingError::truncated(what, n, available));
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn skip(&mut self, n: usize, what: &str) -> Result<(), ListingError> {
        self.take(n, what).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8, ListingError> {
        Ok(self.take(1, "byte")?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, ListingError> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16_le(&mut self) -> Result<u16, ListingError> {
        let b = self.take(2, "u16")?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn read_u16_be(&mut self) -> Result<u16, ListingError> {
        let b = self.take(2, "u16")?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn read_u32_le(&mut self) -> Result<u32, ListingError> {
        let b = self.take(4, "u32")?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_u32_be(&mut self) -> Result<u32, ListingError> {
        let b = self.take(4, "u32")?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_i32_le(&mut self) -> Result<i32, ListingError> {
        Ok(self.read_u32_le()? as i32)
    }

    /// Read a null-terminated byte run, consuming the terminator.
    ///
    /// Bytes become chars one-for-one (no UTF-8 decoding): section and
    /// symbol names are byte strings and the formats only guarantee ASCII.
    /// Hitting the end of the buffer terminates the string instead of
    /// failing, matching the degraded-name behavior of the ELF reader.
    pub fn read_cstr(&mut self) -> String {
        let mut s = String::new();
        while self.pos < self.data.len() {
            let b = self.data[self.pos];
            self.pos += 1;
            if b == 0 {
                break;
            }
            s.push(b as char);
        }
        s
    }

    /// Unsigned LEB128: 7 bits per byte, least-significant group first,
    /// continues while the high bit is set, capped at 6 bytes.
    pub fn read_uleb128(&mut self) -> Result<u64, ListingError> {
        let mut result: u64 = 0;
        let mut shift = 0u32;
        for _ in 0..LEB128_MAX_BYTES {
            let byte = self.read_u8()?;
            result |= u64::from(byte & 0x7f) << shift;
            shift += 7;
            if byte & 0x80 == 0 {
                break;
            }
        }
        Ok(result)
    }

    /// Signed LEB128: as the unsigned variant, plus sign extension when the
    /// final consumed group's sign bit is set.
    pub fn read_sleb128(&mut self) -> Result<i64, ListingError> {
        let mut result: i64 = 0;
        let mut shift = 0u32;
        let mut byte = 0u8;
        for _ in 0..LEB128_MAX_BYTES {
            byte = self.read_u8()?;
            result |= i64::from(byte & 0x7f) << shift;
            shift += 7;
            if byte & 0x80 == 0 {
                break;
            }
        }
        if shift < 64 && byte & 0x40 != 0 {
            result |= !0i64 << shift;
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_uleb128(mut value: u64) -> Vec<u8> {
        let mut out = Vec::new();
        loop {
            let mut byte = (value & 0x7f) as u8;
            value >>= 7;
            if value != 0 {
                byte |= 0x80;
            }
            out.push(byte);
            if value == 0 {
                break;
            }
        }
        out
    }

    fn encode_sleb128(mut value: i64) -> Vec<u8> {
        let mut out = Vec::new();
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            let sign = byte & 0x40 != 0;
            let done = (value == 0 && !sign) || (value == -1 && sign);
            out.push(if done { byte } else { byte | 0x80 });
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn test_uleb128_round_trip() {
        for value in [0u64, 1, 127, 128, 300, 624_485, u64::from(u32::MAX)] {
            let bytes = encode_uleb128(value);
            let mut cursor = Cursor::new(&bytes);
            assert_eq!(cursor.read_uleb128().unwrap(), value, "value {value}");
            assert!(cursor.is_end());
        }
    }

    #[test]
    fn test_sleb128_round_trip() {
        for value in [0i64, 1, -1, 2, -2, 63, -64, 127, -128, 624_485, -624_485] {
            let bytes = encode_sleb128(value);
            let mut cursor = Cursor::new(&bytes);
            assert_eq!(cursor.read_sleb128().unwrap(), value, "value {value}");
            assert!(cursor.is_end());
        }
    }

    #[test]
    fn test_sleb128_single_byte_negative() {
        let mut cursor = Cursor::new(&[0x7f]);
        assert_eq!(cursor.read_sleb128().unwrap(), -1);
    }

    #[test]
    fn test_uleb128_two_byte() {
        let mut cursor = Cursor::new(&[0x80, 0x01]);
        assert_eq!(cursor.read_uleb128().unwrap(), 128);
    }

    #[test]
    fn test_fixed_width_reads() {
        let data = [0x01, 0x02, 0x03, 0x04, 0xff, 0xff, 0xff, 0xff];
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.read_u32_le().unwrap(), 0x0403_0201);
        assert_eq!(cursor.read_i32_le().unwrap(), -1);
        assert!(cursor.is_end());

        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.read_u16_le().unwrap(), 0x0201);
        assert_eq!(cursor.read_u16_be().unwrap(), 0x0304);
    }

    #[test]
    fn test_read_past_end_is_malformed() {
        let mut cursor = Cursor::new(&[0x01]);
        assert!(cursor.read_u32_le().is_err());
    }

    #[test]
    fn test_cstr_reads_bytes_and_stops_at_nul() {
        let data = b".text.main\0trailing";
        let mut cursor = Cursor::new(data);
        assert_eq!(cursor.read_cstr(), ".text.main");
        assert_eq!(cursor.position(), 11);
    }

    #[test]
    fn test_cstr_without_terminator_stops_at_end() {
        let mut cursor = Cursor::new(b"abc");
        assert_eq!(cursor.read_cstr(), "abc");
        assert!(cursor.is_end());
    }

    #[test]
    fn test_cstr_non_ascii_is_byte_for_byte() {
        // 0xe9 is not valid UTF-8 on its own; names are code units, not text.
        let data = [0x61, 0xe9, 0x62, 0x00];
        let mut cursor = Cursor::new(&data);
        let s = cursor.read_cstr();
        assert_eq!(s.chars().count(), 3);
        assert_eq!(s.chars().nth(1), Some('\u{e9}'));
    }
}
