//! Generation 2: bit-packed flag word, dictionary codes, delta dates.
//!
//! One u16 flag word replaces generation 1's per-field presence bytes, the
//! due date is stored as a varint delta from the issue date, and the
//! currency and token address go through the static dictionaries with a
//! literal fallback. Everything else keeps generation-1 framing. Frozen
//! permanently.

use crate::codec::primitives::{Reader, Writer};
use crate::codec::{
    read_currency, read_invoice_id, read_token_address, unwrap, validate_invoice, wrap,
    write_currency, write_invoice_id, write_token_address,
};
use crate::error::{DecodeError, EncodeError};
use crate::limits::{MARKER_V2, MAX_ITEMS, MAX_NOTES_LEN, MAX_STRING_LEN};
use crate::model::{Invoice, LineItem, Party, Quantity};

/// Optional-field bit positions in the generation-2 flag word.
///
/// Generation 3 keeps its own near-identical enumeration; the two layouts
/// are frozen independently so neither can drift under the other.
mod flags {
    pub const TOKEN_ADDRESS: u16 = 1 << 0;
    pub const FROM_WALLET: u16 = 1 << 1;
    pub const FROM_EMAIL: u16 = 1 << 2;
    pub const FROM_ADDRESS: u16 = 1 << 3;
    pub const FROM_PHONE: u16 = 1 << 4;
    pub const CLIENT_WALLET: u16 = 1 << 5;
    pub const CLIENT_EMAIL: u16 = 1 << 6;
    pub const CLIENT_ADDRESS: u16 = 1 << 7;
    pub const CLIENT_PHONE: u16 = 1 << 8;
    pub const TAX: u16 = 1 << 9;
    pub const DISCOUNT: u16 = 1 << 10;
    pub const NOTES: u16 = 1 << 11;

    /// Bits with no assigned meaning; must be zero on the wire.
    pub const RESERVED: u16 = !0x0FFF;
}

fn presence_flags(invoice: &Invoice) -> u16 {
    let mut word = 0u16;
    let mut set = |bit: u16, present: bool| {
        if present {
            word |= bit;
        }
    };
    set(flags::TOKEN_ADDRESS, invoice.token_address.is_some());
    set(flags::FROM_WALLET, invoice.from.wallet.is_some());
    set(flags::FROM_EMAIL, invoice.from.email.is_some());
    set(flags::FROM_ADDRESS, invoice.from.address.is_some());
    set(flags::FROM_PHONE, invoice.from.phone.is_some());
    set(flags::CLIENT_WALLET, invoice.client.wallet.is_some());
    set(flags::CLIENT_EMAIL, invoice.client.email.is_some());
    set(flags::CLIENT_ADDRESS, invoice.client.address.is_some());
    set(flags::CLIENT_PHONE, invoice.client.phone.is_some());
    set(flags::TAX, invoice.tax.is_some());
    set(flags::DISCOUNT, invoice.discount.is_some());
    set(flags::NOTES, invoice.notes.is_some());
    word
}

/// Encodes an invoice as a generation-2 link.
pub fn encode(invoice: &Invoice) -> Result<String, EncodeError> {
    validate_invoice(invoice)?;
    Ok(wrap(MARKER_V2, &encode_payload(invoice)))
}

fn encode_payload(invoice: &Invoice) -> Vec<u8> {
    let mut writer = Writer::with_capacity(160);

    writer.write_u16_be(presence_flags(invoice));
    write_invoice_id(&mut writer, &invoice.invoice_id);
    writer.write_u32_be(invoice.issued_at);
    // Zigzag so a due date before the issue date still round-trips instead
    // of silently corrupting.
    writer.write_signed_varint(invoice.due_at as i64 - invoice.issued_at as i64);
    writer.write_varint(invoice.network_id);
    write_currency(&mut writer, &invoice.currency);
    if let Some(address) = &invoice.token_address {
        write_token_address(&mut writer, address);
    }
    writer.write_varint(invoice.decimals as u64);

    encode_party(&mut writer, &invoice.from);
    encode_party(&mut writer, &invoice.client);

    writer.write_varint(invoice.items.len() as u64);
    for item in &invoice.items {
        writer.write_string(&item.description);
        writer.write_string(&item.quantity.to_wire());
        writer.write_string(&item.rate);
    }

    // No presence bytes here: the flag word is the sole indicator.
    if let Some(tax) = &invoice.tax {
        writer.write_string(tax);
    }
    if let Some(discount) = &invoice.discount {
        writer.write_string(discount);
    }
    if let Some(notes) = &invoice.notes {
        writer.write_string(notes);
    }

    writer.into_bytes()
}

fn encode_party(writer: &mut Writer, party: &Party) {
    writer.write_string(&party.name);
    if let Some(wallet) = &party.wallet {
        writer.write_address(wallet);
    }
    if let Some(email) = &party.email {
        writer.write_string(email);
    }
    if let Some(address) = &party.address {
        writer.write_string(address);
    }
    if let Some(phone) = &party.phone {
        writer.write_string(phone);
    }
}

/// Decodes a generation-2 link. Rejects any other generation's marker.
pub fn decode(text: &str) -> Result<Invoice, DecodeError> {
    let payload = unwrap(text, MARKER_V2)?;
    let mut reader = Reader::new(&payload);

    let word = reader.read_u16_be("flag word")?;
    if word & flags::RESERVED != 0 {
        return Err(DecodeError::ReservedBitsSet);
    }

    let invoice_id = read_invoice_id(&mut reader)?;
    let issued_at = reader.read_u32_be("issued at")?;
    let delta = reader.read_signed_varint("due date delta")?;
    let due_at = (issued_at as i64)
        .checked_add(delta)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or(DecodeError::MalformedEncoding {
            context: "due date delta",
        })?;
    let network_id = reader.read_varint("network id")?;
    let currency = read_currency(&mut reader)?;
    let token_address = if word & flags::TOKEN_ADDRESS != 0 {
        Some(read_token_address(&mut reader)?)
    } else {
        None
    };
    let decimals = reader.read_varint_u32("decimals")?;

    let from = decode_party(
        &mut reader,
        word,
        flags::FROM_WALLET,
        flags::FROM_EMAIL,
        flags::FROM_ADDRESS,
        flags::FROM_PHONE,
    )?;
    let client = decode_party(
        &mut reader,
        word,
        flags::CLIENT_WALLET,
        flags::CLIENT_EMAIL,
        flags::CLIENT_ADDRESS,
        flags::CLIENT_PHONE,
    )?;

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

    let tax = if word & flags::TAX != 0 {
        Some(reader.read_string(MAX_STRING_LEN, "tax")?)
    } else {
        None
    };
    let discount = if word & flags::DISCOUNT != 0 {
        Some(reader.read_string(MAX_STRING_LEN, "discount")?)
    } else {
        None
    };
    let notes = if word & flags::NOTES != 0 {
        Some(reader.read_string(MAX_NOTES_LEN, "notes")?)
    } else {
        None
    };

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

fn decode_party(
    reader: &mut Reader<'_>,
    word: u16,
    wallet_bit: u16,
    email_bit: u16,
    address_bit: u16,
    phone_bit: u16,
) -> Result<Party, DecodeError> {
    let name = reader.read_string(MAX_STRING_LEN, "party name")?;
    let wallet = if word & wallet_bit != 0 {
        Some(reader.read_address("party wallet")?)
    } else {
        None
    };
    let email = if word & email_bit != 0 {
        Some(reader.read_string(MAX_STRING_LEN, "party email")?)
    } else {
        None
    };
    let address = if word & address_bit != 0 {
        Some(reader.read_string(MAX_STRING_LEN, "party address")?)
    } else {
        None
    };
    let phone = if word & phone_bit != 0 {
        Some(reader.read_string(MAX_STRING_LEN, "party phone")?)
    } else {
        None
    };
    Ok(Party {
        name,
        wallet,
        email,
        address,
        phone,
    })
}
