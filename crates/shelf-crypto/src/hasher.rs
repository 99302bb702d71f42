/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag (e.g., `"shelf-book-key-v1"`) that is
/// prepended to every hash computation, so a book title and a journal payload
/// with identical bytes never produce the same digest.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for catalog keys derived from book titles.
    pub const BOOK_KEY: Self = Self {
        domain: "shelf-book-key-v1",
    };
    /// Hasher for journal entry payloads.
    pub const JOURNAL: Self = Self {
        domain: "shelf-journal-v1",
    };

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        *hasher.finalize().as_bytes()
    }
}
