use serde::{Deserialize, Serialize};
use shelf_types::{AccountId, BookKey};

use crate::book::Book;
use crate::error::LedgerError;
use crate::event::LedgerEvent;
use crate::journal::JournalEntry;
use crate::operation::Operation;

/// Write boundary: submit operations on behalf of a caller.
pub trait LedgerWriter: Send + Sync {
    /// Apply `operation` atomically; returns the journal entry it produced.
    fn submit(&self, operation: &Operation) -> Result<JournalEntry, LedgerError>;

    fn add_book(
        &self,
        caller: &AccountId,
        title: &str,
        copies: u64,
    ) -> Result<LedgerEvent, LedgerError> {
        self.submit(&Operation::add_book(*caller, title, copies))
            .map(|entry| entry.event)
    }

    fn borrow_book(&self, caller: &AccountId, key: &BookKey) -> Result<LedgerEvent, LedgerError> {
        self.submit(&Operation::borrow_book(*caller, *key))
            .map(|entry| entry.event)
    }

    fn return_book(&self, caller: &AccountId, key: &BookKey) -> Result<LedgerEvent, LedgerError> {
        self.submit(&Operation::return_book(*caller, *key))
            .map(|entry| entry.event)
    }
}

/// Read boundary for queries, enumeration, and audit.
pub trait LedgerReader: Send + Sync {
    /// The record at `key`; `NotFound` for unknown keys.
    fn book(&self, key: &BookKey) -> Result<Book, LedgerError>;

    /// Current borrowers of `key`; empty for unknown keys.
    fn borrowers(&self, key: &BookKey) -> Result<Vec<AccountId>, LedgerError>;

    fn key_at(&self, index: usize) -> Result<BookKey, LedgerError>;

    fn key_count(&self) -> Result<usize, LedgerError>;

    fn keys(&self) -> Result<Vec<BookKey>, LedgerError>;

    fn journal(&self) -> Result<Vec<JournalEntry>, LedgerError>;

    fn info(&self) -> Result<LedgerInfo, LedgerError>;
}

/// Provenance summary of a ledger instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerInfo {
    /// The administrator, who created the ledger.
    pub owner: AccountId,
    pub book_count: usize,
    pub applied_operations: u64,
    /// Operations refused since this instance started; not journaled.
    pub rejected_operations: u64,
    pub journal_head: Option<[u8; 32]>,
}
