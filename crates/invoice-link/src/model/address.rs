//! 20-byte account/contract addresses.
//!
//! Addresses travel on the wire as 20 raw bytes without a textual prefix.
//! Parsing is case-insensitive; display is the lowercase `0x`-prefixed form.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error returned when parsing an [`Address`] from text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("address must be 40 hex characters with an optional 0x prefix")]
pub struct AddressParseError;

/// A 20-byte address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 20]);

impl Address {
    /// Wraps 20 raw bytes as an address.
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

// Strict single-digit decode: no sign, no whitespace, no radix prefix.
fn hex_nibble(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        if hex.len() != 40 {
            return Err(AddressParseError);
        }
        let mut bytes = [0u8; 20];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let hi = hex_nibble(chunk[0]).ok_or(AddressParseError)?;
            let lo = hex_nibble(chunk[1]).ok_or(AddressParseError)?;
            bytes[i] = (hi << 4) | lo;
        }
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("0x")?;
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_display_roundtrip() {
        let s = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";
        let addr: Address = s.parse().unwrap();
        assert_eq!(addr.to_string(), s);
    }

    #[test]
    fn test_parse_case_insensitive() {
        let lower: Address = "0xdac17f958d2ee523a2206206994597c13d831ec7".parse().unwrap();
        let upper: Address = "0xDAC17F958D2EE523A2206206994597C13D831EC7".parse().unwrap();
        let no_prefix: Address = "dac17f958d2ee523a2206206994597c13d831ec7".parse().unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower, no_prefix);
        // Display is always lowercase canonical
        assert_eq!(upper.to_string(), "0xdac17f958d2ee523a2206206994597c13d831ec7");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("".parse::<Address>().is_err());
        assert!("0x1234".parse::<Address>().is_err());
        assert!("0xzz0b86991c6218b36c1d19d4a2e9eb0ce3606eb48".parse::<Address>().is_err());
        // 41 hex chars
        assert!("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb481".parse::<Address>().is_err());
    }

    #[test]
    fn test_parse_rejects_signed_and_padded_pairs() {
        // from_str_radix would accept these pair-wise; the address parser
        // must not.
        assert!("+a".repeat(20).parse::<Address>().is_err());
        assert!("-1".repeat(20).parse::<Address>().is_err());
        assert!(" a".repeat(20).parse::<Address>().is_err());
        assert!("a ".repeat(20).parse::<Address>().is_err());
    }

    #[test]
    fn test_bytes_roundtrip() {
        let bytes = [7u8; 20];
        let addr = Address::from_bytes(bytes);
        assert_eq!(*addr.as_bytes(), bytes);
    }
}
