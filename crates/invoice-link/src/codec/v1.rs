//! Generation 1: plain binary layout.
//!
//! Every field in declared order, fixed-width where possible, varints for
//! small integers, and an explicit one-byte presence flag ahead of every
//! optional field. No dictionary, no delta encoding. Frozen permanently;
//! newer links use generations 2 and 3, but generation-1 links must keep
//! decoding forever.

use crate::codec::primitives::{Reader, Writer};
use crate::codec::{read_invoice_id, unwrap, validate_invoice, wrap, write_invoice_id};
use crate::error::{DecodeError, EncodeError};
use crate::limits::{MARKER_V1, MAX_ITEMS, MAX_NOTES_LEN, MAX_STRING_LEN};
use crate::model::{Invoice, LineItem, Party, Quantity};

/// Encodes an invoice as a generation-1 link.
pub fn encode(invoice: &Invoice) -> Result<String, EncodeError> {
    validate_invoice(invoice)?;
    Ok(wrap(MARKER_V1, &encode_payload(invoice)))
}

fn encode_payload(invoice: &Invoice) -> Vec<u8> {
    let mut writer = Writer::with_capacity(192);

    write_invoice_id(&mut writer, &invoice.invoice_id);
    writer.write_u32_be(invoice.issued_at);
    writer.write_u32_be(invoice.due_at);
    writer.write_varint(invoice.network_id);
    writer.write_string(&invoice.currency);
    writer.write_optional_address(invoice.token_address.as_ref());
    writer.write_varint(invoice.decimals as u64);

    encode_party(&mut writer, &invoice.from);
    encode_party(&mut writer, &invoice.client);

    writer.write_varint(invoice.items.len() as u64);
    for item in &invoice.items {
        writer.write_string(&item.description);
        writer.write_string(&item.quantity.to_wire());
        writer.write_string(&item.rate);
    }

    writer.write_optional_string(invoice.tax.as_deref());
    writer.write_optional_string(invoice.discount.as_deref());
    writer.write_optional_string(invoice.notes.as_deref());

    writer.into_bytes()
}

fn encode_party(writer: &mut Writer, party: &Party) {
    writer.write_string(&party.name);
    writer.write_optional_address(party.wallet.as_ref());
    writer.write_optional_string(party.email.as_deref());
    writer.write_optional_string(party.address.as_deref());
    writer.write_optional_string(party.phone.as_deref());
}

/// Decodes a generation-1 link. Rejects any other generation's marker.
pub fn decode(text: &str) -> Result<Invoice, DecodeError> {
    let payload = unwrap(text, MARKER_V1)?;
    let mut reader = Reader::new(&payload);

    let invoice_id = read_invoice_id(&mut reader)?;
    let issued_at = reader.read_u32_be("issued at")?;
    let due_at = reader.read_u32_be("due at")?;
    let network_id = reader.read_varint("network id")?;
    let currency = reader.read_string(MAX_STRING_LEN, "currency")?;
    let token_address = reader.read_optional_address("token address")?;
    let decimals = reader.read_varint_u32("decimals")?;

    let from = decode_party(&mut reader)?;
    let client = decode_party(&mut reader)?;

    let item_count = reader.read_varint("item count")? as usize;
    if item_count > MAX_ITEMS {
        return Err(DecodeError::LengthExceedsLimit {
            field: "items",
            len: item_count,
            max: MAX_ITEMS,
        });
    }
    let mut items = Vec::with_capacity(item_count);
    for _ in 0..item_count {
        let description = reader.read_string(MAX_STRING_LEN, "description")?;
        let quantity = Quantity::from_wire(reader.read_string(MAX_STRING_LEN, "quantity")?);
        let rate = reader.read_string(MAX_STRING_LEN, "rate")?;
        items.push(LineItem {
            description,
            quantity,
            rate,
        });
    }

    let tax = reader.read_optional_string(MAX_STRING_LEN, "tax")?;
    let discount = reader.read_optional_string(MAX_STRING_LEN, "discount")?;
    let notes = reader.read_optional_string(MAX_NOTES_LEN, "notes")?;

    reader.finish()?;

    Ok(Invoice {
        invoice_id,
        issued_at,
        due_at,
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
    })
}

fn decode_party(reader: &mut Reader<'_>) -> Result<Party, DecodeError> {
    let name = reader.read_string(MAX_STRING_LEN, "party name")?;
    let wallet = reader.read_optional_address("party wallet")?;
    let email = reader.read_optional_string(MAX_STRING_LEN, "party email")?;
    let address = reader.read_optional_string(MAX_STRING_LEN, "party address")?;
    let phone = reader.read_optional_string(MAX_STRING_LEN, "party phone")?;
    Ok(Party {
        name,
        wallet,
        email,
        address,
        phone,
    })
}
