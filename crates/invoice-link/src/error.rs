//! Error types for invoice link encoding/decoding.

use thiserror::Error;

/// Error during decoding.
///
/// Decode input comes straight out of a URL fragment and is treated as
/// attacker-controlled: every failure is a descriptive error, never a
/// partially populated record and never a panic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("input is empty")]
    EmptyInput,

    #[error("character {character:?} is not in the Base62 alphabet")]
    InvalidCharacter { character: char },

    #[error("unsupported generation marker {marker:?}")]
    UnsupportedVersion { marker: char },

    #[error("unexpected end of input while reading {context}")]
    UnexpectedEof { context: &'static str },

    #[error("varint exceeds maximum length (10 bytes)")]
    VarintTooLong,

    #[error("varint overflow (value exceeds u64)")]
    VarintOverflow,

    #[error("{field} length {len} exceeds maximum {max}")]
    LengthExceedsLimit {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("invalid UTF-8 in {field}")]
    InvalidUtf8 { field: &'static str },

    #[error("invalid presence flag {value} (expected 0x00 or 0x01)")]
    InvalidPresenceFlag { value: u8 },

    #[error("reserved flag bits are non-zero")]
    ReservedBitsSet,

    #[error("{table} dictionary has no entry for code {code}")]
    InvalidDictionaryCode { table: &'static str, code: u8 },

    #[error("text block has {actual} segments, expected {expected}")]
    SegmentCountMismatch { expected: usize, actual: usize },

    #[error("deflate decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("{count} bytes left over after decoding")]
    TrailingBytes { count: usize },

    #[error("malformed encoding: {context}")]
    MalformedEncoding { context: &'static str },
}

/// Error during encoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("{field} length {len} exceeds maximum {max}")]
    LengthExceedsLimit {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("{field} contains the reserved separator byte 0x1F")]
    ReservedSeparator { field: &'static str },

    #[error("deflate compression failed: {0}")]
    CompressionFailed(String),
}
