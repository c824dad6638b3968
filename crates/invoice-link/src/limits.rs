//! Wire constants and security limits for decoding untrusted input.

/// Marker character for generation 1 (plain binary).
pub const MARKER_V1: char = '1';
/// Marker character for generation 2 (bit-packed + dictionary + delta).
pub const MARKER_V2: char = '2';
/// Marker character for generation 3 (hybrid with aggregated text block).
pub const MARKER_V3: char = '3';

/// Maximum decoded payload size. Links larger than this are rejected before
/// any field parsing happens.
pub const MAX_PAYLOAD_SIZE: usize = 64 * 1024;

/// Maximum character length of the Base62 body of a link. A Base62
/// character carries just under 6 bits, so a payload within
/// [`MAX_PAYLOAD_SIZE`] never needs more than 11/8 characters per byte.
/// Checked before the radix conversion, whose cost grows quadratically,
/// so oversized input is rejected in constant time.
pub const MAX_ENCODED_LEN: usize = MAX_PAYLOAD_SIZE * 11 / 8;

/// Maximum byte length of any single text field.
pub const MAX_STRING_LEN: usize = 4 * 1024;

/// Maximum byte length of the notes field.
pub const MAX_NOTES_LEN: usize = 8 * 1024;

/// Maximum byte length of the generation-3 aggregated text block
/// (before and after decompression).
pub const MAX_TEXT_BLOCK_SIZE: usize = 48 * 1024;

/// Maximum number of line items.
pub const MAX_ITEMS: usize = 256;

/// Maximum encoded length of a varint (64 bits, 7 bits per byte).
pub const MAX_VARINT_BYTES: usize = 10;

/// Minimum raw text-block length before generation 3 attempts compression.
/// Below this, DEFLATE's fixed overhead can only grow the payload.
pub const COMPRESS_THRESHOLD: usize = 64;

/// Separator byte between segments of the generation-3 text block.
pub const SEGMENT_SEPARATOR: u8 = 0x1F;
