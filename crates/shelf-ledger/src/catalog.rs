use std::collections::HashMap;

use shelf_types::BookKey;

use crate::book::Book;
use crate::error::LedgerError;

/// All books plus the order in which their keys were first added.
///
/// `order` holds each key exactly once and `books` has an entry for every
/// key in `order`. Both only grow.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    books: HashMap<BookKey, Book>,
    order: Vec<BookKey>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, key: &BookKey) -> Option<&Book> {
        self.books.get(key)
    }

    /// Key at `index` in insertion order.
    pub fn key_at(&self, index: usize) -> Result<BookKey, LedgerError> {
        self.order
            .get(index)
            .copied()
            .ok_or(LedgerError::IndexOutOfRange {
                index,
                len: self.order.len(),
            })
    }

    /// All keys in insertion order.
    pub fn keys(&self) -> &[BookKey] {
        &self.order
    }

    /// Books in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&BookKey, &Book)> {
        self.order
            .iter()
            .filter_map(|key| self.books.get(key).map(|book| (key, book)))
    }

    /// Insert a new record. A key already present is left untouched.
    pub(crate) fn insert(&mut self, key: BookKey, book: Book) {
        if self.books.contains_key(&key) {
            return;
        }
        self.books.insert(key, book);
        self.order.push(key);
    }

    pub(crate) fn get_mut(&mut self, key: &BookKey) -> Option<&mut Book> {
        self.books.get_mut(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(seed: u8) -> BookKey {
        BookKey::from_hash([seed; 32])
    }

    #[test]
    fn empty_catalog() {
        let catalog = Catalog::new();
        assert!(catalog.is_empty());
        assert_eq!(
            catalog.key_at(0).unwrap_err(),
            LedgerError::IndexOutOfRange { index: 0, len: 0 }
        );
    }

    #[test]
    fn keys_keep_insertion_order() {
        let mut catalog = Catalog::new();
        catalog.insert(key(3), Book::new("c", 1));
        catalog.insert(key(1), Book::new("a", 1));
        catalog.insert(key(2), Book::new("b", 1));

        assert_eq!(catalog.keys(), &[key(3), key(1), key(2)]);
        assert_eq!(catalog.key_at(1).unwrap(), key(1));
        let titles: Vec<_> = catalog.iter().map(|(_, b)| b.title.as_str()).collect();
        assert_eq!(titles, vec!["c", "a", "b"]);
    }

    #[test]
    fn insert_never_duplicates_a_key() {
        let mut catalog = Catalog::new();
        catalog.insert(key(1), Book::new("first", 1));
        catalog.insert(key(1), Book::new("second", 5));

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(&key(1)).unwrap().title, "first");
    }
}
