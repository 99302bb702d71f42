use serde::{Deserialize, Serialize};
use shelf_types::AccountId;

/// A catalog record.
///
/// `title` is fixed at creation. `copies` counts copies on the shelf, not
/// copies ever issued, and `borrowers` lists the accounts holding the rest,
/// each at most once, in borrow order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub copies: u64,
    pub borrowers: Vec<AccountId>,
}

impl Book {
    pub fn new(title: impl Into<String>, copies: u64) -> Self {
        Self {
            title: title.into(),
            copies,
            borrowers: Vec::new(),
        }
    }

    /// A book is available while at least one copy is on the shelf.
    pub fn is_available(&self) -> bool {
        self.copies > 0
    }

    /// Whether `account` currently holds a copy.
    pub fn is_held_by(&self, account: &AccountId) -> bool {
        self.borrowers.contains(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_book_has_no_borrowers() {
        let book = Book::new("Test Book", 2);
        assert_eq!(book.title, "Test Book");
        assert_eq!(book.copies, 2);
        assert!(book.borrowers.is_empty());
        assert!(book.is_available());
    }

    #[test]
    fn zero_copies_is_exhausted() {
        assert!(!Book::new("Empty", 0).is_available());
    }

    #[test]
    fn membership() {
        let alice = AccountId::from_label("alice").unwrap();
        let mut book = Book::new("Test Book", 1);
        assert!(!book.is_held_by(&alice));
        book.borrowers.push(alice);
        assert!(book.is_held_by(&alice));
    }
}
