//! Compact invoice links: a versioned binary codec that carries a full
//! invoice record inside a URL-safe Base62 string, so an invoice can be
//! shared as a link with no server-side storage at all.
//!
//! Encoded text is a generation marker character followed by the Base62
//! rendering of a binary payload. Three generations exist, each frozen the
//! day its successor shipped: generation 1 is a plain field-by-field
//! layout, generation 2 adds a bit-packed flag word, symbol dictionaries
//! and delta-coded dates, and generation 3 gathers all free text into one
//! block and DEFLATE-compresses it when that pays off. [`encode`] always
//! produces the newest generation; [`decode`] accepts every generation
//! ever shipped.
//!
//! # Quick start
//!
//! ```
//! use invoice_link::{decode, encode, Invoice, LineItem, Party, Quantity};
//!
//! let invoice = Invoice {
//!     invoice_id: "INV-042".to_string(),
//!     issued_at: 1_700_000_000,
//!     due_at: 1_702_592_000,
//!     network_id: 1,
//!     currency: "USDC".to_string(),
//!     token_address: None,
//!     decimals: 6,
//!     from: Party {
//!         name: "Ada Lovelace".to_string(),
//!         wallet: None,
//!         email: Some("ada@example.com".to_string()),
//!         address: None,
//!         phone: None,
//!     },
//!     client: Party {
//!         name: "Babbage & Co".to_string(),
//!         wallet: None,
//!         email: None,
//!         address: None,
//!         phone: None,
//!     },
//!     items: vec![LineItem {
//!         description: "Analytical engine consulting".to_string(),
//!         quantity: Quantity::Int(10),
//!         rate: "100".to_string(),
//!     }],
//!     tax: None,
//!     discount: None,
//!     notes: None,
//! };
//!
//! let link = encode(&invoice)?;
//! assert!(link.chars().all(|c| c.is_ascii_alphanumeric()));
//! assert_eq!(decode(&link)?, invoice);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod base62;
pub mod codec;
pub mod dict;
pub mod error;
pub mod limits;
pub mod model;

mod compress;

pub use codec::{decode, encode, encoded_size};
pub use error::{DecodeError, EncodeError};
pub use model::{Address, AddressParseError, Invoice, LineItem, Party, Quantity};

/// Version of the invoice-link crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
