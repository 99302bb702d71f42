//! Foundation types for the Shelf lending ledger.
//!
//! Every other Shelf crate depends on `shelf-types`.
//!
//! # Key Types
//!
//! - [`AccountId`]: 20-byte account identifier, parsed from hex or derived from a label
//! - [`BookKey`]: 32-byte catalog key derived from a book title
//! - [`TypeError`]: parse failures for the above

pub mod account;
pub mod error;
pub mod key;

pub use account::AccountId;
pub use error::TypeError;
pub use key::BookKey;

/// `s` without a leading `0x` or `0X`, or `None` if it has neither.
pub fn strip_hex_prefix(s: &str) -> Option<&str> {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
}
