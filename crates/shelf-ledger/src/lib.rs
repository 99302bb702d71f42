//! Lending ledger core for Shelf.
//!
//! This crate owns the book catalog and every rule that changes it:
//! - `Library` state machine: add, borrow, and return with all-or-nothing effects
//! - Content-derived book keys from normalized titles
//! - Hash-linked `Journal` of applied operations and their events
//! - `LedgerWriter` / `LedgerReader` trait boundaries
//! - `InMemoryLedger` implementation for tests, the CLI, and embedding
//! - Deterministic replay and a filtered live event feed

pub mod book;
pub mod catalog;
pub mod error;
pub mod event;
pub mod feed;
pub mod journal;
pub mod key;
pub mod library;
pub mod memory;
pub mod operation;
pub mod replay;
pub mod traits;

pub use book::Book;
pub use catalog::Catalog;
pub use error::LedgerError;
pub use event::{EventKind, LedgerEvent};
pub use feed::{EventFeed, EventFilter, EventStream};
pub use journal::{verify_entries, Journal, JournalEntry};
pub use key::{derive_key, normalize_title};
pub use library::Library;
pub use memory::InMemoryLedger;
pub use operation::{Operation, OperationKind};
pub use replay::{ReplayEngine, ReplayResult};
pub use traits::{LedgerInfo, LedgerReader, LedgerWriter};
