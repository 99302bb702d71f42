use std::fmt;

use serde::{Deserialize, Serialize};
use shelf_types::{AccountId, BookKey};

/// Classification of ledger events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    BookAdded,
    BookUpdated,
    BookBorrowed,
    BookReturned,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::BookAdded => "BookAdded",
            Self::BookUpdated => "BookUpdated",
            Self::BookBorrowed => "BookBorrowed",
            Self::BookReturned => "BookReturned",
        };
        write!(f, "{s}")
    }
}

/// The single event emitted by a successful mutation.
///
/// Numeric fields always carry the post-operation copy count, never a delta:
/// `BookUpdated.copies` is the new total and `BookBorrowed.remaining` is what
/// is left on the shelf.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    BookAdded {
        key: BookKey,
        title: String,
        copies: u64,
    },
    BookUpdated {
        key: BookKey,
        title: String,
        copies: u64,
    },
    BookBorrowed {
        key: BookKey,
        borrower: AccountId,
        remaining: u64,
    },
    BookReturned {
        key: BookKey,
        returner: AccountId,
        copies: u64,
    },
}

impl LedgerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::BookAdded { .. } => EventKind::BookAdded,
            Self::BookUpdated { .. } => EventKind::BookUpdated,
            Self::BookBorrowed { .. } => EventKind::BookBorrowed,
            Self::BookReturned { .. } => EventKind::BookReturned,
        }
    }

    pub fn key(&self) -> &BookKey {
        match self {
            Self::BookAdded { key, .. }
            | Self::BookUpdated { key, .. }
            | Self::BookBorrowed { key, .. }
            | Self::BookReturned { key, .. } => key,
        }
    }

    /// Copies on the shelf once the event has been applied.
    pub fn copies_after(&self) -> u64 {
        match self {
            Self::BookAdded { copies, .. }
            | Self::BookUpdated { copies, .. }
            | Self::BookReturned { copies, .. } => *copies,
            Self::BookBorrowed { remaining, .. } => *remaining,
        }
    }
}

impl fmt::Display for LedgerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BookAdded { key, title, copies } | Self::BookUpdated { key, title, copies } => {
                write!(f, "{}({key}, {title:?}, {copies})", self.kind())
            }
            Self::BookBorrowed {
                key,
                borrower,
                remaining,
            } => write!(f, "BookBorrowed({key}, {borrower}, {remaining})"),
            Self::BookReturned {
                key,
                returner,
                copies,
            } => write!(f, "BookReturned({key}, {returner}, {copies})"),
        }
    }
}
