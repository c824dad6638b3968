//! Primitive encoding/decoding for the invoice wire format.
//!
//! Implements the byte-buffer writer/reader: fixed-width big-endian
//! integers, varints, zigzag signed varints, length-prefixed UTF-8 text and
//! fixed-size blobs. No invoice semantics live here.

use crate::error::DecodeError;
use crate::limits::MAX_VARINT_BYTES;
use crate::model::Address;

// =============================================================================
// DECODING
// =============================================================================

/// Reader for decoding binary data.
///
/// Wraps a byte slice and provides methods for reading primitives with
/// bounds checking and error handling. Decode input is attacker-controlled,
/// so every read validates the remaining length first.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader over a byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the number of remaining bytes.
    pub fn remaining_len(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns an error if any input is left unconsumed.
    pub fn finish(&self) -> Result<(), DecodeError> {
        let count = self.remaining_len();
        if count > 0 {
            return Err(DecodeError::TrailingBytes { count });
        }
        Ok(())
    }

    /// Reads a single byte.
    #[inline]
    pub fn read_byte(&mut self, context: &'static str) -> Result<u8, DecodeError> {
        if self.pos >= self.data.len() {
            return Err(DecodeError::UnexpectedEof { context });
        }
        let byte = self.data[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    /// Reads exactly n bytes.
    #[inline]
    pub fn read_bytes(&mut self, n: usize, context: &'static str) -> Result<&'a [u8], DecodeError> {
        if n > self.data.len() - self.pos {
            return Err(DecodeError::UnexpectedEof { context });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Reads a big-endian u32 (absolute timestamps).
    #[inline]
    pub fn read_u32_be(&mut self, context: &'static str) -> Result<u32, DecodeError> {
        let bytes = self.read_bytes(4, context)?;
        // read_bytes guarantees exactly 4 bytes, try_into always succeeds
        Ok(u32::from_be_bytes(bytes.try_into().unwrap()))
    }

    /// Reads a big-endian u16 (flag words).
    #[inline]
    pub fn read_u16_be(&mut self, context: &'static str) -> Result<u16, DecodeError> {
        let bytes = self.read_bytes(2, context)?;
        Ok(u16::from_be_bytes(bytes.try_into().unwrap()))
    }

    /// Reads an unsigned varint (7 bits per byte, high bit = continuation).
    #[inline]
    pub fn read_varint(&mut self, context: &'static str) -> Result<u64, DecodeError> {
        let mut result: u64 = 0;
        for i in 0..MAX_VARINT_BYTES {
            let byte = self.read_byte(context)?;
            let value = (byte & 0x7F) as u64;
            let shift = 7 * i as u32;
            if shift == 63 && value > 1 {
                return Err(DecodeError::VarintOverflow);
            }
            result |= value << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(DecodeError::VarintTooLong)
    }

    /// Reads a varint that must fit in 32 bits (chain ids, decimals).
    pub fn read_varint_u32(&mut self, context: &'static str) -> Result<u32, DecodeError> {
        let value = self.read_varint(context)?;
        u32::try_from(value).map_err(|_| DecodeError::MalformedEncoding { context })
    }

    /// Reads a signed varint (zigzag encoded).
    pub fn read_signed_varint(&mut self, context: &'static str) -> Result<i64, DecodeError> {
        let unsigned = self.read_varint(context)?;
        Ok(zigzag_decode(unsigned))
    }

    /// Reads a length-prefixed UTF-8 string.
    #[inline]
    pub fn read_string(
        &mut self,
        max_len: usize,
        field: &'static str,
    ) -> Result<String, DecodeError> {
        let len = self.read_varint(field)? as usize;
        if len > max_len {
            return Err(DecodeError::LengthExceedsLimit {
                field,
                len,
                max: max_len,
            });
        }
        let bytes = self.read_bytes(len, field)?;
        std::str::from_utf8(bytes)
            .map(|s| s.to_string())
            .map_err(|_| DecodeError::InvalidUtf8 { field })
    }

    /// Reads a fixed 16-byte identifier blob.
    #[inline]
    pub fn read_uuid(&mut self, context: &'static str) -> Result<[u8; 16], DecodeError> {
        let bytes = self.read_bytes(16, context)?;
        Ok(bytes.try_into().unwrap())
    }

    /// Reads a fixed 20-byte address blob.
    #[inline]
    pub fn read_address(&mut self, context: &'static str) -> Result<Address, DecodeError> {
        let bytes = self.read_bytes(20, context)?;
        let array: [u8; 20] = bytes.try_into().unwrap();
        Ok(Address::from_bytes(array))
    }

    /// Reads a one-byte presence flag. Only 0x00 and 0x01 are valid; anything
    /// else is a decode error rather than a guessed boolean.
    pub fn read_presence(&mut self, context: &'static str) -> Result<bool, DecodeError> {
        match self.read_byte(context)? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(DecodeError::InvalidPresenceFlag { value }),
        }
    }

    /// Reads an optional length-prefixed string (presence byte + value).
    pub fn read_optional_string(
        &mut self,
        max_len: usize,
        field: &'static str,
    ) -> Result<Option<String>, DecodeError> {
        if self.read_presence(field)? {
            Ok(Some(self.read_string(max_len, field)?))
        } else {
            Ok(None)
        }
    }

    /// Reads an optional 20-byte address (presence byte + value).
    pub fn read_optional_address(
        &mut self,
        context: &'static str,
    ) -> Result<Option<Address>, DecodeError> {
        if self.read_presence(context)? {
            Ok(Some(self.read_address(context)?))
        } else {
            Ok(None)
        }
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Writer for encoding binary data over a monotonically growing buffer.
#[derive(Debug, Clone, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    /// Creates a new writer.
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Creates a new writer with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Returns the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Returns the number of bytes written.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if no bytes have been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Writes a single byte.
    #[inline]
    pub fn write_byte(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Writes raw bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Writes a big-endian u32.
    #[inline]
    pub fn write_u32_be(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Writes a big-endian u16.
    #[inline]
    pub fn write_u16_be(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Writes an unsigned varint.
    #[inline]
    pub fn write_varint(&mut self, mut value: u64) {
        let mut buf = [0u8; MAX_VARINT_BYTES];
        let mut len = 0;
        loop {
            let mut byte = (value & 0x7F) as u8;
            value >>= 7;
            if value != 0 {
                byte |= 0x80;
            }
            buf[len] = byte;
            len += 1;
            if value == 0 {
                break;
            }
        }
        self.buf.extend_from_slice(&buf[..len]);
    }

    /// Writes a signed varint (zigzag encoded).
    pub fn write_signed_varint(&mut self, value: i64) {
        self.write_varint(zigzag_encode(value));
    }

    /// Writes a length-prefixed UTF-8 string.
    pub fn write_string(&mut self, s: &str) {
        self.write_varint(s.len() as u64);
        self.buf.extend_from_slice(s.as_bytes());
    }

    /// Writes a fixed 16-byte identifier blob.
    #[inline]
    pub fn write_uuid(&mut self, bytes: &[u8; 16]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Writes a fixed 20-byte address blob.
    #[inline]
    pub fn write_address(&mut self, address: &Address) {
        self.buf.extend_from_slice(address.as_bytes());
    }

    /// Writes a one-byte presence flag.
    pub fn write_presence(&mut self, present: bool) {
        self.buf.push(present as u8);
    }

    /// Writes an optional string as presence byte + value.
    pub fn write_optional_string(&mut self, value: Option<&str>) {
        match value {
            Some(s) => {
                self.write_presence(true);
                self.write_string(s);
            }
            None => self.write_presence(false),
        }
    }

    /// Writes an optional address as presence byte + value.
    pub fn write_optional_address(&mut self, value: Option<&Address>) {
        match value {
            Some(addr) => {
                self.write_presence(true);
                self.write_address(addr);
            }
            None => self.write_presence(false),
        }
    }
}

// =============================================================================
// ZIGZAG ENCODING
// =============================================================================

/// Encodes a signed integer using zigzag encoding.
///
/// Maps negative numbers to odd positive numbers:
/// 0 -> 0, -1 -> 1, 1 -> 2, -2 -> 3, 2 -> 4, ...
#[inline]
pub fn zigzag_encode(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

/// Decodes a zigzag-encoded unsigned integer back to signed.
#[inline]
pub fn zigzag_decode(n: u64) -> i64 {
    ((n >> 1) as i64) ^ (-((n & 1) as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;

    #[test]
    fn test_zigzag_roundtrip() {
        for v in [0i64, 1, -1, 127, -128, i64::MAX, i64::MIN] {
            assert_eq!(zigzag_decode(zigzag_encode(v)), v);
        }
    }

    #[test]
    fn test_zigzag_values() {
        assert_eq!(zigzag_encode(0), 0);
        assert_eq!(zigzag_encode(-1), 1);
        assert_eq!(zigzag_encode(1), 2);
        assert_eq!(zigzag_encode(-2), 3);
    }

    #[test]
    fn test_varint_roundtrip() {
        let test_values = [0u64, 1, 127, 128, 255, 256, 16383, 16384, u64::MAX];
        for v in test_values {
            let mut writer = Writer::new();
            writer.write_varint(v);

            let bytes = writer.into_bytes();
            let mut reader = Reader::new(&bytes);
            let decoded = reader.read_varint("test").unwrap();
            assert_eq!(v, decoded, "failed for {}", v);
        }
    }

    #[test]
    fn test_varint_too_long() {
        let data = [0x80u8; 11];
        let mut reader = Reader::new(&data);
        assert!(matches!(
            reader.read_varint("test"),
            Err(DecodeError::VarintTooLong)
        ));
    }

    #[test]
    fn test_varint_overflow() {
        // 10th byte carrying more than the single remaining bit
        let data = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F];
        let mut reader = Reader::new(&data);
        assert!(matches!(
            reader.read_varint("test"),
            Err(DecodeError::VarintOverflow)
        ));
    }

    #[test]
    fn test_u32_be_roundtrip() {
        let mut writer = Writer::new();
        writer.write_u32_be(1_700_000_000);
        let bytes = writer.into_bytes();
        assert_eq!(bytes.len(), 4);

        let mut reader = Reader::new(&bytes);
        assert_eq!(reader.read_u32_be("test").unwrap(), 1_700_000_000);
    }

    #[test]
    fn test_string_roundtrip() {
        for s in ["", "hello", "unicode: \u{1F600} éàü"] {
            let mut writer = Writer::new();
            writer.write_string(s);

            let bytes = writer.into_bytes();
            let mut reader = Reader::new(&bytes);
            assert_eq!(reader.read_string(1000, "test").unwrap(), s);
        }
    }

    #[test]
    fn test_string_too_long() {
        let mut writer = Writer::new();
        writer.write_string(&"x".repeat(200));
        let bytes = writer.into_bytes();

        let mut reader = Reader::new(&bytes);
        assert!(matches!(
            reader.read_string(100, "test"),
            Err(DecodeError::LengthExceedsLimit { max: 100, .. })
        ));
    }

    #[test]
    fn test_string_invalid_utf8() {
        let mut writer = Writer::new();
        writer.write_varint(2);
        writer.write_bytes(&[0xFF, 0xFE]);
        let bytes = writer.into_bytes();

        let mut reader = Reader::new(&bytes);
        assert!(matches!(
            reader.read_string(100, "test"),
            Err(DecodeError::InvalidUtf8 { .. })
        ));
    }

    #[test]
    fn test_presence_flag() {
        let mut reader = Reader::new(&[0, 1, 2]);
        assert!(!reader.read_presence("test").unwrap());
        assert!(reader.read_presence("test").unwrap());
        assert_eq!(
            reader.read_presence("test"),
            Err(DecodeError::InvalidPresenceFlag { value: 2 })
        );
    }

    #[test]
    fn test_optional_address_roundtrip() {
        let addr = Address::from_bytes([9u8; 20]);

        let mut writer = Writer::new();
        writer.write_optional_address(Some(&addr));
        writer.write_optional_address(None);
        let bytes = writer.into_bytes();

        let mut reader = Reader::new(&bytes);
        assert_eq!(reader.read_optional_address("test").unwrap(), Some(addr));
        assert_eq!(reader.read_optional_address("test").unwrap(), None);
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn test_unexpected_eof() {
        let data = [0u8; 5];
        let mut reader = Reader::new(&data);
        assert!(matches!(
            reader.read_bytes(10, "test"),
            Err(DecodeError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_trailing_bytes_detected() {
        let mut reader = Reader::new(&[1, 2, 3]);
        reader.read_byte("test").unwrap();
        assert_eq!(reader.finish(), Err(DecodeError::TrailingBytes { count: 2 }));
    }
}
