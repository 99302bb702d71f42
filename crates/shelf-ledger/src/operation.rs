use serde::{Deserialize, Serialize};
use shelf_types::{AccountId, BookKey};

/// A mutating request together with the account the host says issued it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub caller: AccountId,
    pub kind: OperationKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationKind {
    AddBook { title: String, copies: u64 },
    BorrowBook { key: BookKey },
    ReturnBook { key: BookKey },
}

impl Operation {
    pub fn add_book(caller: AccountId, title: impl Into<String>, copies: u64) -> Self {
        Self {
            caller,
            kind: OperationKind::AddBook {
                title: title.into(),
                copies,
            },
        }
    }

    pub fn borrow_book(caller: AccountId, key: BookKey) -> Self {
        Self {
            caller,
            kind: OperationKind::BorrowBook { key },
        }
    }

    pub fn return_book(caller: AccountId, key: BookKey) -> Self {
        Self {
            caller,
            kind: OperationKind::ReturnBook { key },
        }
    }

    pub fn name(&self) -> &'static str {
        match self.kind {
            OperationKind::AddBook { .. } => "add_book",
            OperationKind::BorrowBook { .. } => "borrow_book",
            OperationKind::ReturnBook { .. } => "return_book",
        }
    }
}
