//! Core data types for invoice records.

pub mod address;
pub mod id;
pub mod invoice;

pub use address::{Address, AddressParseError};
pub use invoice::{Invoice, LineItem, Party, Quantity};
