//! Client SDK for the Shelf lending ledger.
//!
//! Operations are submitted through a [`LedgerEndpoint`] and stay pending
//! until the endpoint resolves them. [`ShelfClient`] wraps the
//! submit-then-poll cycle, catalog enumeration, and journal export for
//! applications and the `shelf` CLI.

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod journal_file;

pub use client::{AuditReport, BookSummary, Receipt, ShelfClient};
pub use config::{SdkConfig, LOCAL_NETWORK};
pub use endpoint::{InProcessEndpoint, LedgerEndpoint, Resolution, SubmissionId};
pub use error::{SdkError, SdkResult};
pub use journal_file::{load_journal, save_journal};

// Re-export key types
pub use shelf_ledger::{derive_key, EventKind, LedgerError, LedgerEvent, LedgerInfo};
pub use shelf_types::{strip_hex_prefix, AccountId, BookKey};
