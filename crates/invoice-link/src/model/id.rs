//! Invoice identifier packing.
//!
//! Invoice ids are opaque strings, but most of them are UUIDs. A UUID in
//! canonical hyphenated-lowercase form packs as 16 raw bytes on the wire;
//! anything else is stored as a literal string. Packing is only used when
//! the canonical rendering reproduces the original string exactly, so the
//! round-trip is always lossless.

use uuid::Uuid;

/// Packs an invoice id into 16 raw bytes if it is a canonical UUID string.
///
/// Returns `None` for non-UUID ids and for UUID strings whose rendering
/// differs from the canonical hyphenated-lowercase form (those stay literal).
pub fn pack_id(id: &str) -> Option<[u8; 16]> {
    let uuid = Uuid::try_parse(id).ok()?;
    if uuid.hyphenated().to_string() == id {
        Some(*uuid.as_bytes())
    } else {
        None
    }
}

/// Reconstructs the canonical hyphenated-lowercase UUID string from 16 bytes.
pub fn unpack_id(bytes: &[u8; 16]) -> String {
    Uuid::from_bytes(*bytes).hyphenated().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_uuid_packs() {
        let id = "550e8400-e29b-41d4-a716-446655440000";
        let bytes = pack_id(id).unwrap();
        assert_eq!(unpack_id(&bytes), id);
    }

    #[test]
    fn test_non_canonical_uuid_stays_literal() {
        // Uppercase and unhyphenated forms parse as UUIDs but do not render
        // back to the same string, so they must not be packed.
        assert!(pack_id("550E8400-E29B-41D4-A716-446655440000").is_none());
        assert!(pack_id("550e8400e29b41d4a716446655440000").is_none());
    }

    #[test]
    fn test_opaque_id_stays_literal() {
        assert!(pack_id("INV-001").is_none());
        assert!(pack_id("").is_none());
    }
}
