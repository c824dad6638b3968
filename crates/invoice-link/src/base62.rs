//! Base62 text transport.
//!
//! Converts raw bytes to and from a 62-character URL-fragment-safe alphabet
//! by treating the input as a big-endian arbitrary-precision integer.
//! Leading zero bytes carry no numeric magnitude, so they are counted
//! separately and mapped to leading `'0'` characters. This module has no
//! knowledge of the invoice wire format.

use crate::error::DecodeError;

/// The alphabet in value order: digits, lowercase, uppercase.
const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

const INVALID: u8 = 0xFF;

/// Reverse lookup from ASCII byte to symbol value.
const DECODE_TABLE: [u8; 128] = build_decode_table();

const fn build_decode_table() -> [u8; 128] {
    let mut table = [INVALID; 128];
    let mut i = 0;
    while i < ALPHABET.len() {
        table[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
}

/// Encodes bytes as Base62 text. Empty input yields an empty string.
pub fn encode(input: &[u8]) -> String {
    let zeros = input.iter().take_while(|&&b| b == 0).count();

    // Repeated divmod by 62 over the remaining bytes; digits accumulate
    // least-significant first.
    let mut digits: Vec<u8> = Vec::with_capacity(input.len() * 137 / 100 + 1);
    for &byte in &input[zeros..] {
        let mut carry = byte as u32;
        for digit in digits.iter_mut() {
            carry += (*digit as u32) << 8;
            *digit = (carry % 62) as u8;
            carry /= 62;
        }
        while carry > 0 {
            digits.push((carry % 62) as u8);
            carry /= 62;
        }
    }

    let mut out = String::with_capacity(zeros + digits.len());
    for _ in 0..zeros {
        out.push('0');
    }
    for &digit in digits.iter().rev() {
        out.push(ALPHABET[digit as usize] as char);
    }
    out
}

/// Decodes Base62 text back to bytes. Exact inverse of [`encode`].
///
/// Any character outside the alphabet is rejected with
/// [`DecodeError::InvalidCharacter`] naming the offender.
pub fn decode(input: &str) -> Result<Vec<u8>, DecodeError> {
    let mut values = Vec::with_capacity(input.len());
    for character in input.chars() {
        let value = if (character as u32) < 128 {
            DECODE_TABLE[character as usize]
        } else {
            INVALID
        };
        if value == INVALID {
            return Err(DecodeError::InvalidCharacter { character });
        }
        values.push(value);
    }

    let zeros = values.iter().take_while(|&&v| v == 0).count();

    let mut bytes: Vec<u8> = Vec::with_capacity(input.len() * 3 / 4 + 1);
    for &value in &values[zeros..] {
        let mut carry = value as u32;
        for byte in bytes.iter_mut() {
            carry += (*byte as u32) * 62;
            *byte = (carry & 0xFF) as u8;
            carry >>= 8;
        }
        while carry > 0 {
            bytes.push((carry & 0xFF) as u8);
            carry >>= 8;
        }
    }

    let mut out = vec![0u8; zeros];
    out.extend(bytes.iter().rev());
    Ok(out)
}
