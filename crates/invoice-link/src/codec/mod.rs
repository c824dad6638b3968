//! Wire codec: marker dispatch and the three frozen format generations.
//!
//! Encoded text is one generation marker character followed by the Base62
//! rendering of that generation's binary payload. Each generation is
//! terminal and self-contained; a new optimization becomes a new generation,
//! never a mutation of an old one. [`encode`] always uses the newest
//! generation, [`decode`] dispatches on the leading marker.

pub mod primitives;
pub mod v1;
pub mod v2;
pub mod v3;

use crate::base62;
use crate::dict;
use crate::error::{DecodeError, EncodeError};
use crate::limits::{
    MARKER_V1, MARKER_V2, MARKER_V3, MAX_ENCODED_LEN, MAX_ITEMS, MAX_NOTES_LEN, MAX_PAYLOAD_SIZE,
    MAX_STRING_LEN,
};
use crate::model::{self, Address, Invoice, Party};
use primitives::{Reader, Writer};

/// Encodes an invoice with the newest generation.
pub fn encode(invoice: &Invoice) -> Result<String, EncodeError> {
    v3::encode(invoice)
}

/// Decodes an invoice, dispatching on the leading generation marker.
pub fn decode(text: &str) -> Result<Invoice, DecodeError> {
    let marker = text.chars().next().ok_or(DecodeError::EmptyInput)?;
    match marker {
        MARKER_V1 => v1::decode(text),
        MARKER_V2 => v2::decode(text),
        MARKER_V3 => v3::decode(text),
        _ => Err(DecodeError::UnsupportedVersion { marker }),
    }
}

/// Returns the payload byte length of a fresh encode, for UI display of
/// link size. Equal to the length of Base62-decoding the encoded text
/// minus its marker.
pub fn encoded_size(invoice: &Invoice) -> Result<usize, EncodeError> {
    Ok(v3::encode_payload(invoice)?.len())
}

// =============================================================================
// SHARED FIELD ENCODINGS
// =============================================================================

// Invoice id mode bytes, shared by all generations.
const ID_LITERAL: u8 = 0;
const ID_PACKED: u8 = 1;

// Dictionary mode bytes for currency/token fields (generations 2 and 3).
const MODE_LITERAL: u8 = 0;
const MODE_DICT: u8 = 1;

pub(crate) fn write_invoice_id(writer: &mut Writer, id: &str) {
    match model::id::pack_id(id) {
        Some(bytes) => {
            writer.write_byte(ID_PACKED);
            writer.write_uuid(&bytes);
        }
        None => {
            writer.write_byte(ID_LITERAL);
            writer.write_string(id);
        }
    }
}

pub(crate) fn read_invoice_id(reader: &mut Reader<'_>) -> Result<String, DecodeError> {
    match reader.read_byte("invoice id mode")? {
        ID_PACKED => Ok(model::id::unpack_id(&reader.read_uuid("invoice id")?)),
        ID_LITERAL => reader.read_string(MAX_STRING_LEN, "invoice id"),
        _ => Err(DecodeError::MalformedEncoding {
            context: "invoice id mode",
        }),
    }
}

pub(crate) fn write_currency(writer: &mut Writer, currency: &str) {
    match dict::currency_code(currency) {
        Some(code) => {
            writer.write_byte(MODE_DICT);
            writer.write_byte(code);
        }
        None => {
            writer.write_byte(MODE_LITERAL);
            writer.write_string(currency);
        }
    }
}

pub(crate) fn read_currency(reader: &mut Reader<'_>) -> Result<String, DecodeError> {
    match reader.read_byte("currency mode")? {
        MODE_DICT => {
            let code = reader.read_byte("currency code")?;
            dict::currency_for_code(code)
                .map(str::to_string)
                .ok_or(DecodeError::InvalidDictionaryCode {
                    table: "currency",
                    code,
                })
        }
        MODE_LITERAL => reader.read_string(MAX_STRING_LEN, "currency"),
        _ => Err(DecodeError::MalformedEncoding {
            context: "currency mode",
        }),
    }
}

pub(crate) fn write_token_address(writer: &mut Writer, address: &Address) {
    match dict::token_code(address) {
        Some(code) => {
            writer.write_byte(MODE_DICT);
            writer.write_byte(code);
        }
        None => {
            writer.write_byte(MODE_LITERAL);
            writer.write_address(address);
        }
    }
}

pub(crate) fn read_token_address(reader: &mut Reader<'_>) -> Result<Address, DecodeError> {
    match reader.read_byte("token address mode")? {
        MODE_DICT => {
            let code = reader.read_byte("token address code")?;
            dict::token_for_code(code).ok_or(DecodeError::InvalidDictionaryCode {
                table: "token address",
                code,
            })
        }
        MODE_LITERAL => reader.read_address("token address"),
        _ => Err(DecodeError::MalformedEncoding {
            context: "token address mode",
        }),
    }
}

// =============================================================================
// TEXT TRANSPORT WRAPPING
// =============================================================================

pub(crate) fn wrap(marker: char, payload: &[u8]) -> String {
    let body = base62::encode(payload);
    let mut text = String::with_capacity(1 + body.len());
    text.push(marker);
    text.push_str(&body);
    text
}

pub(crate) fn unwrap(text: &str, marker: char) -> Result<Vec<u8>, DecodeError> {
    let mut chars = text.chars();
    let found = chars.next().ok_or(DecodeError::EmptyInput)?;
    if found != marker {
        return Err(DecodeError::UnsupportedVersion { marker: found });
    }
    let body = chars.as_str();
    if body.len() > MAX_ENCODED_LEN {
        return Err(DecodeError::LengthExceedsLimit {
            field: "encoded text",
            len: body.len(),
            max: MAX_ENCODED_LEN,
        });
    }
    let payload = base62::decode(body)?;
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(DecodeError::LengthExceedsLimit {
            field: "payload",
            len: payload.len(),
            max: MAX_PAYLOAD_SIZE,
        });
    }
    Ok(payload)
}

// =============================================================================
// ENCODE-SIDE INPUT VALIDATION
// =============================================================================

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), EncodeError> {
    let len = value.len();
    if len > max {
        return Err(EncodeError::LengthExceedsLimit { field, len, max });
    }
    Ok(())
}

fn check_opt_len(
    field: &'static str,
    value: Option<&String>,
    max: usize,
) -> Result<(), EncodeError> {
    match value {
        Some(s) => check_len(field, s, max),
        None => Ok(()),
    }
}

fn validate_party(party: &Party, name_field: &'static str) -> Result<(), EncodeError> {
    check_len(name_field, &party.name, MAX_STRING_LEN)?;
    check_opt_len("email", party.email.as_ref(), MAX_STRING_LEN)?;
    check_opt_len("address", party.address.as_ref(), MAX_STRING_LEN)?;
    check_opt_len("phone", party.phone.as_ref(), MAX_STRING_LEN)?;
    Ok(())
}

pub(crate) fn validate_invoice(invoice: &Invoice) -> Result<(), EncodeError> {
    check_len("invoice id", &invoice.invoice_id, MAX_STRING_LEN)?;
    check_len("currency", &invoice.currency, MAX_STRING_LEN)?;
    validate_party(&invoice.from, "from name")?;
    validate_party(&invoice.client, "client name")?;
    if invoice.items.len() > MAX_ITEMS {
        return Err(EncodeError::LengthExceedsLimit {
            field: "items",
            len: invoice.items.len(),
            max: MAX_ITEMS,
        });
    }
    for item in &invoice.items {
        check_len("description", &item.description, MAX_STRING_LEN)?;
        check_len("quantity", &item.quantity.to_wire(), MAX_STRING_LEN)?;
        check_len("rate", &item.rate, MAX_STRING_LEN)?;
    }
    check_opt_len("tax", invoice.tax.as_ref(), MAX_STRING_LEN)?;
    check_opt_len("discount", invoice.discount.as_ref(), MAX_STRING_LEN)?;
    check_opt_len("notes", invoice.notes.as_ref(), MAX_NOTES_LEN)?;
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::MARKER_V3;
    use crate::model::{Invoice, LineItem, Party, Quantity};
    use proptest::prelude::*;
    use testing::{full_invoice, minimal_invoice};

    #[test]
    fn test_encode_uses_newest_generation() {
        let text = encode(&minimal_invoice()).unwrap();
        assert!(text.starts_with(MARKER_V3));
    }

    #[test]
    fn test_decode_dispatches_on_marker() {
        let invoice = full_invoice();
        for text in [
            v1::encode(&invoice).unwrap(),
            v2::encode(&invoice).unwrap(),
            v3::encode(&invoice).unwrap(),
        ] {
            assert_eq!(decode(&text).unwrap(), invoice);
        }
    }

    #[test]
    fn test_decode_empty_input() {
        assert_eq!(decode(""), Err(DecodeError::EmptyInput));
    }

    #[test]
    fn test_decode_unknown_marker() {
        assert_eq!(
            decode("9abc"),
            Err(DecodeError::UnsupportedVersion { marker: '9' })
        );
    }

    #[test]
    fn test_decode_invalid_character() {
        let mut text = encode(&minimal_invoice()).unwrap();
        text.push('!');
        assert_eq!(
            decode(&text),
            Err(DecodeError::InvalidCharacter { character: '!' })
        );
    }

    #[test]
    fn test_oversized_text_rejected_before_conversion() {
        // The length gate has to fire on the raw character count; running
        // the radix conversion on input this size would take minutes.
        let text = format!("3{}", "Z".repeat(MAX_ENCODED_LEN * 5));
        assert_eq!(
            decode(&text),
            Err(DecodeError::LengthExceedsLimit {
                field: "encoded text",
                len: MAX_ENCODED_LEN * 5,
                max: MAX_ENCODED_LEN,
            })
        );
    }

    #[test]
    fn test_generation_isolation() {
        let invoice = minimal_invoice();
        let t1 = v1::encode(&invoice).unwrap();
        let t3 = v3::encode(&invoice).unwrap();

        assert_eq!(
            v1::decode(&t3),
            Err(DecodeError::UnsupportedVersion { marker: '3' })
        );
        assert_eq!(
            v2::decode(&t1),
            Err(DecodeError::UnsupportedVersion { marker: '1' })
        );
        assert_eq!(
            v3::decode(&t1),
            Err(DecodeError::UnsupportedVersion { marker: '1' })
        );
    }

    #[test]
    fn test_encoded_size_matches_payload() {
        let invoice = full_invoice();
        let size = encoded_size(&invoice).unwrap();

        let text = encode(&invoice).unwrap();
        let payload = crate::base62::decode(&text[1..]).unwrap();
        assert_eq!(size, payload.len());
        assert!(size > 0);
    }

    #[test]
    fn test_validate_rejects_oversized_fields() {
        let mut invoice = minimal_invoice();
        invoice.notes = Some("x".repeat(MAX_NOTES_LEN + 1));
        assert!(matches!(
            encode(&invoice),
            Err(EncodeError::LengthExceedsLimit { field: "notes", .. })
        ));

        let mut invoice = minimal_invoice();
        invoice.items = vec![
            LineItem {
                description: String::new(),
                quantity: Quantity::Int(1),
                rate: "1".to_string(),
            };
            MAX_ITEMS + 1
        ];
        assert!(matches!(
            encode(&invoice),
            Err(EncodeError::LengthExceedsLimit { field: "items", .. })
        ));
    }

    // =========================================================================
    // PROPERTY TESTS
    // =========================================================================

    fn arb_text() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 .,:@#&()-]{0,40}"
    }

    fn arb_opt_text() -> impl Strategy<Value = Option<String>> {
        proptest::option::of(arb_text())
    }

    fn arb_address() -> impl Strategy<Value = crate::model::Address> {
        any::<[u8; 20]>().prop_map(crate::model::Address::from_bytes)
    }

    fn arb_invoice_id() -> impl Strategy<Value = String> {
        prop_oneof![
            "INV-[0-9]{1,6}",
            arb_text(),
            any::<[u8; 16]>().prop_map(|b| uuid::Uuid::from_bytes(b).hyphenated().to_string()),
        ]
    }

    fn arb_currency() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("USDC".to_string()),
            Just("ETH".to_string()),
            Just("DAI".to_string()),
            // Longer than any table entry, so always a literal fallback
            "[A-Z]{6,8}",
        ]
    }

    fn arb_quantity() -> impl Strategy<Value = Quantity> {
        prop_oneof![
            any::<i64>().prop_map(Quantity::Int),
            "[0-9]{1,3}\\.[0-9]{1,2}".prop_map(Quantity::Text),
        ]
    }

    fn arb_party() -> impl Strategy<Value = Party> {
        (
            arb_text(),
            proptest::option::of(arb_address()),
            arb_opt_text(),
            arb_opt_text(),
            arb_opt_text(),
        )
            .prop_map(|(name, wallet, email, address, phone)| Party {
                name,
                wallet,
                email,
                address,
                phone,
            })
    }

    fn arb_item() -> impl Strategy<Value = LineItem> {
        (arb_text(), arb_quantity(), "[0-9]{1,6}(\\.[0-9]{1,2})?").prop_map(
            |(description, quantity, rate)| LineItem {
                description,
                quantity,
                rate,
            },
        )
    }

    fn arb_invoice() -> impl Strategy<Value = Invoice> {
        (
            (
                arb_invoice_id(),
                any::<u32>(),
                0u32..1_000_000,
                1u64..100_000,
                arb_currency(),
                proptest::option::of(arb_address()),
                0u32..40,
            ),
            (
                arb_party(),
                arb_party(),
                proptest::collection::vec(arb_item(), 0..5),
                arb_opt_text(),
                arb_opt_text(),
                arb_opt_text(),
            ),
        )
            .prop_map(
                |(
                    (invoice_id, issued_at, due_delta, network_id, currency, token_address, decimals),
                    (from, client, items, tax, discount, notes),
                )| Invoice {
                    invoice_id,
                    issued_at,
                    due_at: issued_at.saturating_add(due_delta),
                    network_id,
                    currency,
                    token_address,
                    decimals,
                    from,
                    client,
                    items,
                    tax,
                    discount,
                    notes,
                },
            )
    }

    proptest! {
        #[test]
        fn prop_roundtrip_every_generation(invoice in arb_invoice()) {
            let t1 = v1::encode(&invoice).unwrap();
            prop_assert_eq!(&v1::decode(&t1).unwrap(), &invoice);

            let t2 = v2::encode(&invoice).unwrap();
            prop_assert_eq!(&v2::decode(&t2).unwrap(), &invoice);

            let t3 = v3::encode(&invoice).unwrap();
            prop_assert_eq!(&v3::decode(&t3).unwrap(), &invoice);

            // Top-level dispatch agrees
            prop_assert_eq!(&decode(&t3).unwrap(), &invoice);
        }

        #[test]
        fn prop_encode_is_deterministic(invoice in arb_invoice()) {
            prop_assert_eq!(encode(&invoice).unwrap(), encode(&invoice).unwrap());
        }

        #[test]
        fn prop_truncated_input_never_panics(invoice in arb_invoice(), cut in 0usize..200) {
            let text = encode(&invoice).unwrap();
            let cut = cut.min(text.len());
            // Must return cleanly, error or not; the decoder never panics on
            // truncated input.
            let _ = decode(&text[..cut]);
        }

        #[test]
        fn prop_base62_roundtrip(bytes in proptest::collection::vec(any::<u8>(), 0..200)) {
            let text = crate::base62::encode(&bytes);
            prop_assert_eq!(crate::base62::decode(&text).unwrap(), bytes);
        }
    }
}
