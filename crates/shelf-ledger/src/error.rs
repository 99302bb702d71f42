use shelf_types::{AccountId, BookKey};

/// Errors produced by ledger operations.
///
/// Variants through `CopiesOverflow` are operation rejections: they are raised before
/// any state is written, so a rejected operation has no effect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("caller {caller} is not the ledger owner")]
    Unauthorized { caller: AccountId },

    #[error("book {key} not found")]
    NotFound { key: BookKey },

    #[error("there aren't available copies of {key}")]
    NoAvailableCopies { key: BookKey },

    #[error("{borrower} already holds a copy of {key}")]
    AlreadyBorrowed { key: BookKey, borrower: AccountId },

    #[error("{account} has not borrowed {key}")]
    NotBorrowed { key: BookKey, account: AccountId },

    #[error("key index {index} out of range (catalog holds {len} keys)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("book title must not be empty")]
    EmptyTitle,

    #[error("copy count of {key} would overflow")]
    CopiesOverflow { key: BookKey },

    #[error("journal integrity violation at seq {seq}: {reason}")]
    JournalIntegrity { seq: u64, reason: String },

    #[error("replay diverged at seq {seq}: {reason}")]
    ReplayDivergence { seq: u64, reason: String },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("ledger lock poisoned")]
    LockPoisoned,
}

impl LedgerError {
    /// Whether this error is a rejected operation rather than a ledger fault.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized { .. }
                | Self::NotFound { .. }
                | Self::NoAvailableCopies { .. }
                | Self::AlreadyBorrowed { .. }
                | Self::NotBorrowed { .. }
                | Self::IndexOutOfRange { .. }
                | Self::EmptyTitle
                | Self::CopiesOverflow { .. }
        )
    }
}
