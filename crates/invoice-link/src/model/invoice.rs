//! Invoice record types.
//!
//! These are plain value types with no identity beyond their fields. The
//! caller is responsible for semantic validation (required fields, address
//! checksums, `due_at >= issued_at`); the codec only guarantees lossless
//! round-trips.

use crate::model::Address;

/// A complete invoice record.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    /// Opaque invoice identifier.
    pub invoice_id: String,
    /// Issue date, Unix seconds.
    pub issued_at: u32,
    /// Due date, Unix seconds. `due_at >= issued_at` is a caller invariant.
    pub due_at: u32,
    /// Chain id of the payment network.
    pub network_id: u64,
    /// Short currency ticker (e.g. "USDC").
    pub currency: String,
    /// Token contract address, absent for the chain's native currency.
    pub token_address: Option<Address>,
    /// Token decimals.
    pub decimals: u32,
    /// Issuing party.
    pub from: Party,
    /// Billed party.
    pub client: Party,
    /// Ordered line items.
    pub items: Vec<LineItem>,
    /// Tax percentage/amount as an opaque decimal string.
    pub tax: Option<String>,
    /// Discount percentage/amount as an opaque decimal string.
    pub discount: Option<String>,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Contact information for one party of an invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct Party {
    pub name: String,
    pub wallet: Option<Address>,
    pub email: Option<String>,
    /// Physical address.
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// One billable line of an invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub description: String,
    pub quantity: Quantity,
    /// Unit rate as an opaque decimal string. The codec does no arithmetic.
    pub rate: String,
}

/// A line-item quantity, either a whole number or an opaque decimal string.
///
/// The wire stores quantities as text. A decoded quantity is numeric exactly
/// when the stored text parses as an `i64` and re-formats to the identical
/// text, so `"10"` comes back as `Int(10)` while `"1.5"` and `"007"` stay
/// textual.
#[derive(Debug, Clone, PartialEq)]
pub enum Quantity {
    Int(i64),
    Text(String),
}

impl Quantity {
    /// Renders the quantity as its wire text.
    pub fn to_wire(&self) -> String {
        match self {
            Quantity::Int(n) => n.to_string(),
            Quantity::Text(s) => s.clone(),
        }
    }

    /// Reconstructs a quantity from its wire text.
    pub fn from_wire(text: String) -> Quantity {
        if let Ok(n) = text.parse::<i64>() {
            if n.to_string() == text {
                return Quantity::Int(n);
            }
        }
        Quantity::Text(text)
    }
}
