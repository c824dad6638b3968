//! Selective DEFLATE adapter for the generation-3 text block.
//!
//! Generation 3 compresses only the aggregated text block, never the full
//! payload, so fixed-width and dictionary-coded fields stay untouched. The
//! caller applies the size gating ([`crate::limits::COMPRESS_THRESHOLD`] and
//! the shrink check); this module is a plain compress/decompress pair.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;

use crate::error::{DecodeError, EncodeError};

/// Compresses bytes with raw DEFLATE at the highest level.
///
/// Link length matters more than encode speed here, so the level is fixed at
/// best; a fixed level also keeps the output deterministic.
pub fn compress(input: &[u8]) -> Result<Vec<u8>, EncodeError> {
    let mut encoder = DeflateEncoder::new(Vec::with_capacity(input.len()), Compression::best());
    encoder
        .write_all(input)
        .map_err(|e| EncodeError::CompressionFailed(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| EncodeError::CompressionFailed(e.to_string()))
}

/// Decompresses a raw DEFLATE block, bounding the output at `max_size`.
pub fn decompress(input: &[u8], max_size: usize) -> Result<Vec<u8>, DecodeError> {
    let mut decoder = DeflateDecoder::new(input).take(max_size as u64 + 1);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| DecodeError::DecompressionFailed(e.to_string()))?;
    if out.len() > max_size {
        return Err(DecodeError::LengthExceedsLimit {
            field: "text block",
            len: out.len(),
            max: max_size,
        });
    }
    Ok(out)
}
