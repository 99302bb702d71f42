use shelf_types::{AccountId, BookKey};

use crate::book::Book;
use crate::catalog::Catalog;
use crate::error::LedgerError;
use crate::event::LedgerEvent;
use crate::key::{derive_key, normalize_title};
use crate::operation::{Operation, OperationKind};

/// The lending state machine: an owner and the catalog it administers.
///
/// Every mutation runs in two steps. [`Library::plan`] checks all
/// preconditions against the current state and returns the event the
/// operation would emit, without writing anything. [`Library::commit`] then
/// applies that event. Because events carry post-state values, committing is
/// infallible and a rejected operation leaves no trace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Library {
    owner: AccountId,
    catalog: Catalog,
}

impl Library {
    pub fn new(owner: AccountId) -> Self {
        Self {
            owner,
            catalog: Catalog::new(),
        }
    }

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Validate `operation` and apply it.
    pub fn apply(&mut self, operation: &Operation) -> Result<LedgerEvent, LedgerError> {
        let event = self.plan(operation)?;
        self.commit(&event);
        Ok(event)
    }

    pub fn add_book(
        &mut self,
        caller: &AccountId,
        title: &str,
        copies: u64,
    ) -> Result<LedgerEvent, LedgerError> {
        self.apply(&Operation::add_book(*caller, title, copies))
    }

    pub fn borrow_book(
        &mut self,
        caller: &AccountId,
        key: &BookKey,
    ) -> Result<LedgerEvent, LedgerError> {
        self.apply(&Operation::borrow_book(*caller, *key))
    }

    pub fn return_book(
        &mut self,
        caller: &AccountId,
        key: &BookKey,
    ) -> Result<LedgerEvent, LedgerError> {
        self.apply(&Operation::return_book(*caller, *key))
    }

    /// Compute the event `operation` would emit, or the reason it is rejected.
    pub fn plan(&self, operation: &Operation) -> Result<LedgerEvent, LedgerError> {
        let caller = &operation.caller;
        match &operation.kind {
            OperationKind::AddBook { title, copies } => self.plan_add(caller, title, *copies),
            OperationKind::BorrowBook { key } => self.plan_borrow(caller, key),
            OperationKind::ReturnBook { key } => self.plan_return(caller, key),
        }
    }

    fn plan_add(
        &self,
        caller: &AccountId,
        title: &str,
        copies: u64,
    ) -> Result<LedgerEvent, LedgerError> {
        if *caller != self.owner {
            return Err(LedgerError::Unauthorized { caller: *caller });
        }
        let title = normalize_title(title);
        if title.is_empty() {
            return Err(LedgerError::EmptyTitle);
        }

        let key = derive_key(title);
        match self.catalog.get(&key) {
            None => Ok(LedgerEvent::BookAdded {
                key,
                title: title.to_string(),
                copies,
            }),
            Some(book) => {
                let total = book
                    .copies
                    .checked_add(copies)
                    .ok_or(LedgerError::CopiesOverflow { key })?;
                Ok(LedgerEvent::BookUpdated {
                    key,
                    title: book.title.clone(),
                    copies: total,
                })
            }
        }
    }

    fn plan_borrow(&self, caller: &AccountId, key: &BookKey) -> Result<LedgerEvent, LedgerError> {
        let book = self.require(key)?;
        if book.copies == 0 {
            return Err(LedgerError::NoAvailableCopies { key: *key });
        }
        if book.is_held_by(caller) {
            return Err(LedgerError::AlreadyBorrowed {
                key: *key,
                borrower: *caller,
            });
        }
        Ok(LedgerEvent::BookBorrowed {
            key: *key,
            borrower: *caller,
            remaining: book.copies - 1,
        })
    }

    fn plan_return(&self, caller: &AccountId, key: &BookKey) -> Result<LedgerEvent, LedgerError> {
        let book = self.require(key)?;
        if !book.is_held_by(caller) {
            return Err(LedgerError::NotBorrowed {
                key: *key,
                account: *caller,
            });
        }
        let copies = book
            .copies
            .checked_add(1)
            .ok_or(LedgerError::CopiesOverflow { key: *key })?;
        Ok(LedgerEvent::BookReturned {
            key: *key,
            returner: *caller,
            copies,
        })
    }

    /// Apply an event produced by [`Library::plan`] against this same state.
    pub(crate) fn commit(&mut self, event: &LedgerEvent) {
        match event {
            LedgerEvent::BookAdded { key, title, copies } => {
                self.catalog.insert(*key, Book::new(title.clone(), *copies));
            }
            LedgerEvent::BookUpdated { key, copies, .. } => {
                if let Some(book) = self.catalog.get_mut(key) {
                    book.copies = *copies;
                }
            }
            LedgerEvent::BookBorrowed {
                key,
                borrower,
                remaining,
            } => {
                if let Some(book) = self.catalog.get_mut(key) {
                    book.copies = *remaining;
                    book.borrowers.push(*borrower);
                }
            }
            LedgerEvent::BookReturned {
                key,
                returner,
                copies,
            } => {
                if let Some(book) = self.catalog.get_mut(key) {
                    book.copies = *copies;
                    if let Some(pos) = book.borrowers.iter().position(|b| b == returner) {
                        book.borrowers.remove(pos);
                    }
                }
            }
        }
    }

    fn require(&self, key: &BookKey) -> Result<&Book, LedgerError> {
        self.catalog
            .get(key)
            .ok_or(LedgerError::NotFound { key: *key })
    }

    // ---- Queries ----

    /// The record at `key`. Unknown keys are an error.
    pub fn book(&self, key: &BookKey) -> Result<&Book, LedgerError> {
        self.require(key)
    }

    /// Current borrowers of `key`, in borrow order. Unknown keys have none.
    pub fn borrowers(&self, key: &BookKey) -> &[AccountId] {
        self.catalog
            .get(key)
            .map(|book| book.borrowers.as_slice())
            .unwrap_or(&[])
    }

    pub fn key_at(&self, index: usize) -> Result<BookKey, LedgerError> {
        self.catalog.key_at(index)
    }

    pub fn key_count(&self) -> usize {
        self.catalog.len()
    }

    pub fn keys(&self) -> &[BookKey] {
        self.catalog.keys()
    }
}
