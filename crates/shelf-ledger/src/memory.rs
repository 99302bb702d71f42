use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use shelf_types::{AccountId, BookKey};
use tracing::{debug, info};

use crate::book::Book;
use crate::error::LedgerError;
use crate::feed::{EventFeed, EventFilter, EventStream};
use crate::journal::{Journal, JournalEntry};
use crate::library::Library;
use crate::operation::Operation;
use crate::replay::ReplayEngine;
use crate::traits::{LedgerInfo, LedgerReader, LedgerWriter};

/// In-memory ledger for tests, the CLI, and embedding.
///
/// All mutations take the single write lock, so they are applied one at a
/// time and in full. Each applied operation is journaled and then published
/// to the feed while the lock is still held, which keeps feed order equal to
/// journal order.
pub struct InMemoryLedger {
    inner: RwLock<LedgerState>,
    feed: EventFeed,
}

struct LedgerState {
    library: Library,
    journal: Journal,
    rejected: u64,
}

impl InMemoryLedger {
    /// Create an empty ledger administered by `owner`.
    pub fn new(owner: AccountId) -> Self {
        info!(owner = %owner, "ledger created");
        Self::from_parts(Library::new(owner), Journal::new())
    }

    /// Rebuild a ledger from a previously exported journal.
    pub fn restore(owner: AccountId, entries: Vec<JournalEntry>) -> Result<Self, LedgerError> {
        let replayed = ReplayEngine::replay(owner, entries)?;
        info!(
            owner = %owner,
            entries = replayed.applied,
            books = replayed.library.key_count(),
            "ledger restored from journal"
        );
        Ok(Self::from_parts(replayed.library, replayed.journal))
    }

    fn from_parts(library: Library, journal: Journal) -> Self {
        Self {
            inner: RwLock::new(LedgerState {
                library,
                journal,
                rejected: 0,
            }),
            feed: EventFeed::default(),
        }
    }

    /// Subscribe to entries applied from now on.
    pub fn subscribe(&self, filter: EventFilter) -> EventStream {
        self.feed.subscribe(filter)
    }

    /// Snapshot of the whole library.
    pub fn snapshot(&self) -> Result<Library, LedgerError> {
        Ok(self.read()?.library.clone())
    }

    /// Validate the journal's sequence numbers and hash chain.
    pub fn verify_journal(&self) -> Result<(), LedgerError> {
        self.read()?.journal.verify()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, LedgerState>, LedgerError> {
        self.inner.read().map_err(|_| LedgerError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, LedgerState>, LedgerError> {
        self.inner.write().map_err(|_| LedgerError::LockPoisoned)
    }
}

impl LedgerWriter for InMemoryLedger {
    fn submit(&self, operation: &Operation) -> Result<JournalEntry, LedgerError> {
        let mut state = self.write()?;

        let planned = state
            .library
            .plan(operation)
            .and_then(|event| state.journal.prepare(operation.clone(), event));
        let entry = match planned {
            Ok(entry) => entry,
            Err(e) => {
                state.rejected += 1;
                debug!(
                    op = operation.name(),
                    caller = %operation.caller.short_id(),
                    error = %e,
                    "operation rejected"
                );
                return Err(e);
            }
        };

        state.journal.push(entry.clone())?;
        state.library.commit(&entry.event);

        let delivered = self.feed.publish(&entry);
        debug!(
            seq = entry.seq,
            op = operation.name(),
            caller = %operation.caller.short_id(),
            event = %entry.event.kind(),
            key = %entry.event.key().short_hex(),
            copies = entry.event.copies_after(),
            delivered,
            "operation applied"
        );
        Ok(entry)
    }
}

impl LedgerReader for InMemoryLedger {
    fn book(&self, key: &BookKey) -> Result<Book, LedgerError> {
        self.read()?.library.book(key).cloned()
    }

    fn borrowers(&self, key: &BookKey) -> Result<Vec<AccountId>, LedgerError> {
        Ok(self.read()?.library.borrowers(key).to_vec())
    }

    fn key_at(&self, index: usize) -> Result<BookKey, LedgerError> {
        self.read()?.library.key_at(index)
    }

    fn key_count(&self) -> Result<usize, LedgerError> {
        Ok(self.read()?.library.key_count())
    }

    fn keys(&self) -> Result<Vec<BookKey>, LedgerError> {
        Ok(self.read()?.library.keys().to_vec())
    }

    fn journal(&self) -> Result<Vec<JournalEntry>, LedgerError> {
        Ok(self.read()?.journal.entries().to_vec())
    }

    fn info(&self) -> Result<LedgerInfo, LedgerError> {
        let state = self.read()?;
        Ok(LedgerInfo {
            owner: *state.library.owner(),
            book_count: state.library.key_count(),
            applied_operations: state.journal.len() as u64,
            rejected_operations: state.rejected,
            journal_head: state.journal.head(),
        })
    }
}
