use shelf_crypto::ContentHasher;
use shelf_types::BookKey;

/// Canonical form of a title: surrounding whitespace removed.
pub fn normalize_title(title: &str) -> &str {
    title.trim()
}

/// Derive the catalog key for a title.
///
/// Two titles map to the same key iff their normalized forms are equal.
pub fn derive_key(title: &str) -> BookKey {
    BookKey::from_hash(ContentHasher::BOOK_KEY.hash(normalize_title(title).as_bytes()))
}
