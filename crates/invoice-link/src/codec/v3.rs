//! Generation 3: aggregated text block with selective compression.
//!
//! All free-text fields move out of the structured section into one block
//! at the end of the payload, joined by an ASCII unit separator. Putting
//! the prose side by side is what makes DEFLATE worth its header overhead
//! on short inputs; the structured section (ids, dates, dictionary codes,
//! amounts) is never compressed. The current default generation.

use crate::codec::primitives::{Reader, Writer};
use crate::codec::{
    read_currency, read_invoice_id, read_token_address, unwrap, validate_invoice, wrap,
    write_currency, write_invoice_id, write_token_address,
};
use crate::compress;
use crate::error::{DecodeError, EncodeError};
use crate::limits::{
    COMPRESS_THRESHOLD, MARKER_V3, MAX_ITEMS, MAX_STRING_LEN, MAX_TEXT_BLOCK_SIZE,
    SEGMENT_SEPARATOR,
};
use crate::model::{Invoice, LineItem, Party, Quantity};

/// Optional-field bit positions in the generation-3 flag word.
///
/// Deliberately restated rather than shared with generation 2: both layouts
/// are frozen, and a shared definition would let an edit to one silently
/// rewrite the other's wire format.
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

    /// Set when the text block is DEFLATE-compressed.
    pub const COMPRESSED: u16 = 1 << 12;

    /// Bits with no assigned meaning; must be zero on the wire.
    pub const RESERVED: u16 = !0x1FFF;
}

/// Encoder knobs for generation 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Allow compressing the text block when it is large enough and the
    /// compressed form actually comes out smaller. Defaults to on; turning
    /// it off forces the plain block, which is occasionally useful for
    /// debugging a link by eye.
    pub compress: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions { compress: true }
    }
}

/// Encodes an invoice as a generation-3 link with default options.
pub fn encode(invoice: &Invoice) -> Result<String, EncodeError> {
    encode_with_options(invoice, EncodeOptions::default())
}

/// Encodes an invoice as a generation-3 link.
pub fn encode_with_options(
    invoice: &Invoice,
    options: EncodeOptions,
) -> Result<String, EncodeError> {
    Ok(wrap(MARKER_V3, &payload_with_options(invoice, options)?))
}

pub(crate) fn encode_payload(invoice: &Invoice) -> Result<Vec<u8>, EncodeError> {
    payload_with_options(invoice, EncodeOptions::default())
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

fn payload_with_options(
    invoice: &Invoice,
    options: EncodeOptions,
) -> Result<Vec<u8>, EncodeError> {
    validate_invoice(invoice)?;

    let block = build_text_block(invoice)?;
    let mut word = presence_flags(invoice);

    let block = if options.compress && block.len() > COMPRESS_THRESHOLD {
        let compressed = compress::compress(&block)?;
        if compressed.len() < block.len() {
            word |= flags::COMPRESSED;
            compressed
        } else {
            block
        }
    } else {
        block
    };

    let mut writer = Writer::with_capacity(64 + block.len());
    writer.write_u16_be(word);
    write_invoice_id(&mut writer, &invoice.invoice_id);
    writer.write_u32_be(invoice.issued_at);
    writer.write_signed_varint(invoice.due_at as i64 - invoice.issued_at as i64);
    writer.write_varint(invoice.network_id);
    write_currency(&mut writer, &invoice.currency);
    if let Some(address) = &invoice.token_address {
        write_token_address(&mut writer, address);
    }
    writer.write_varint(invoice.decimals as u64);
    if let Some(wallet) = &invoice.from.wallet {
        writer.write_address(wallet);
    }
    if let Some(wallet) = &invoice.client.wallet {
        writer.write_address(wallet);
    }

    writer.write_varint(invoice.items.len() as u64);
    for item in &invoice.items {
        writer.write_string(&item.quantity.to_wire());
        writer.write_string(&item.rate);
    }

    writer.write_varint(block.len() as u64);
    writer.write_bytes(&block);

    Ok(writer.into_bytes())
}

// =============================================================================
// TEXT BLOCK
// =============================================================================

fn push_segment(
    block: &mut Vec<u8>,
    first: &mut bool,
    field: &'static str,
    text: &str,
) -> Result<(), EncodeError> {
    if text.bytes().any(|b| b == SEGMENT_SEPARATOR) {
        return Err(EncodeError::ReservedSeparator { field });
    }
    if !*first {
        block.push(SEGMENT_SEPARATOR);
    }
    *first = false;
    block.extend_from_slice(text.as_bytes());
    Ok(())
}

fn build_text_block(invoice: &Invoice) -> Result<Vec<u8>, EncodeError> {
    let mut block = Vec::new();
    let mut first = true;
    let mut push = |text: &str, field: &'static str| -> Result<(), EncodeError> {
        push_segment(&mut block, &mut first, field, text)
    };

    push(&invoice.from.name, "from name")?;
    if let Some(email) = &invoice.from.email {
        push(email, "from email")?;
    }
    if let Some(address) = &invoice.from.address {
        push(address, "from address")?;
    }
    if let Some(phone) = &invoice.from.phone {
        push(phone, "from phone")?;
    }
    push(&invoice.client.name, "client name")?;
    if let Some(email) = &invoice.client.email {
        push(email, "client email")?;
    }
    if let Some(address) = &invoice.client.address {
        push(address, "client address")?;
    }
    if let Some(phone) = &invoice.client.phone {
        push(phone, "client phone")?;
    }
    for item in &invoice.items {
        push(&item.description, "description")?;
    }
    if let Some(tax) = &invoice.tax {
        push(tax, "tax")?;
    }
    if let Some(discount) = &invoice.discount {
        push(discount, "discount")?;
    }
    if let Some(notes) = &invoice.notes {
        push(notes, "notes")?;
    }

    Ok(block)
}

// =============================================================================
// DECODING
// =============================================================================

/// Decodes a generation-3 link. Rejects any other generation's marker.
pub fn decode(text: &str) -> Result<Invoice, DecodeError> {
    let payload = unwrap(text, MARKER_V3)?;
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
    let from_wallet = if word & flags::FROM_WALLET != 0 {
        Some(reader.read_address("from wallet")?)
    } else {
        None
    };
    let client_wallet = if word & flags::CLIENT_WALLET != 0 {
        Some(reader.read_address("client wallet")?)
    } else {
        None
    };

    let item_count = reader.read_varint("item count")? as usize;
    if item_count > MAX_ITEMS {
        return Err(DecodeError::LengthExceedsLimit {
            field: "items",
            len: item_count,
            max: MAX_ITEMS,
        });
    }
    let mut quantities = Vec::with_capacity(item_count);
    for _ in 0..item_count {
        let quantity = Quantity::from_wire(reader.read_string(MAX_STRING_LEN, "quantity")?);
        let rate = reader.read_string(MAX_STRING_LEN, "rate")?;
        quantities.push((quantity, rate));
    }

    let block_len = reader.read_varint("text block length")? as usize;
    if block_len > MAX_TEXT_BLOCK_SIZE {
        return Err(DecodeError::LengthExceedsLimit {
            field: "text block",
            len: block_len,
            max: MAX_TEXT_BLOCK_SIZE,
        });
    }
    let block = reader.read_bytes(block_len, "text block")?.to_vec();
    reader.finish()?;

    let block = if word & flags::COMPRESSED != 0 {
        compress::decompress(&block, MAX_TEXT_BLOCK_SIZE)?
    } else {
        block
    };

    let expected = expected_segments(word, item_count);
    let segments: Vec<&[u8]> = block.split(|&b| b == SEGMENT_SEPARATOR).collect();
    if segments.len() != expected {
        return Err(DecodeError::SegmentCountMismatch {
            expected,
            actual: segments.len(),
        });
    }

    let mut segments = segments.into_iter();
    let mut next = |field: &'static str| -> Result<String, DecodeError> {
        // Count already checked, the iterator cannot run dry
        let bytes = segments.next().unwrap_or_default();
        String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidUtf8 { field })
    };
    let mut next_if = |set: bool, field: &'static str| -> Result<Option<String>, DecodeError> {
        if set { next(field).map(Some) } else { Ok(None) }
    };

    let from = Party {
        name: next_if(true, "from name")?.unwrap_or_default(),
        wallet: from_wallet,
        email: next_if(word & flags::FROM_EMAIL != 0, "from email")?,
        address: next_if(word & flags::FROM_ADDRESS != 0, "from address")?,
        phone: next_if(word & flags::FROM_PHONE != 0, "from phone")?,
    };
    let client = Party {
        name: next_if(true, "client name")?.unwrap_or_default(),
        wallet: client_wallet,
        email: next_if(word & flags::CLIENT_EMAIL != 0, "client email")?,
        address: next_if(word & flags::CLIENT_ADDRESS != 0, "client address")?,
        phone: next_if(word & flags::CLIENT_PHONE != 0, "client phone")?,
    };

    let mut items = Vec::with_capacity(item_count);
    for (quantity, rate) in quantities {
        items.push(LineItem {
            description: next_if(true, "description")?.unwrap_or_default(),
            quantity,
            rate,
        });
    }

    let tax = next_if(word & flags::TAX != 0, "tax")?;
    let discount = next_if(word & flags::DISCOUNT != 0, "discount")?;
    let notes = next_if(word & flags::NOTES != 0, "notes")?;

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

fn expected_segments(word: u16, item_count: usize) -> usize {
    let optional_bits = [
        flags::FROM_EMAIL,
        flags::FROM_ADDRESS,
        flags::FROM_PHONE,
        flags::CLIENT_EMAIL,
        flags::CLIENT_ADDRESS,
        flags::CLIENT_PHONE,
        flags::TAX,
        flags::DISCOUNT,
        flags::NOTES,
    ];
    // Two party names are always present
    2 + item_count
        + optional_bits
            .iter()
            .filter(|&&bit| word & bit != 0)
            .count()
}
