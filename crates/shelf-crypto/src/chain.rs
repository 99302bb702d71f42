use crate::hasher::ContentHasher;

/// Implemented by records that form a hash chain.
pub trait HasEntryHash {
    /// The entry's own hash.
    fn entry_hash(&self) -> [u8; 32];
    /// The previous entry's hash (None for the first entry).
    fn prev_hash(&self) -> Option<[u8; 32]>;
    /// Canonical payload bytes for hash verification.
    fn payload_bytes(&self) -> Vec<u8>;
}

/// Hash chain integrity verifier.
///
/// A valid chain has no previous hash on its first entry, every later entry
/// links to its predecessor's hash, and every hash recomputes from the
/// entry's payload and link.
pub struct HashChainVerifier;

impl HashChainVerifier {
    pub fn verify_chain(entries: &[impl HasEntryHash]) -> Result<(), ChainError> {
        let mut expected_prev: Option<[u8; 32]> = None;

        for (index, entry) in entries.iter().enumerate() {
            match (expected_prev, entry.prev_hash()) {
                (None, Some(_)) => return Err(ChainError::GenesisHasPrevHash),
                (Some(_), None) => return Err(ChainError::MissingPrevHash { index }),
                (Some(expected), Some(actual)) if expected != actual => {
                    return Err(ChainError::BrokenLink { index })
                }
                _ => {}
            }

            let computed = Self::compute_hash(&entry.payload_bytes(), expected_prev);
            if computed != entry.entry_hash() {
                return Err(ChainError::HashMismatch { index });
            }
            expected_prev = Some(computed);
        }

        Ok(())
    }

    /// Compute the expected hash for a payload and optional previous hash.
    pub fn compute_hash(payload: &[u8], prev_hash: Option<[u8; 32]>) -> [u8; 32] {
        let mut data = Vec::with_capacity(32 + payload.len());
        if let Some(prev) = prev_hash {
            data.extend_from_slice(&prev);
        }
        data.extend_from_slice(payload);
        ContentHasher::JOURNAL.hash(&data)
    }
}

/// Errors from chain verification.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("first entry has a previous hash (should be None)")]
    GenesisHasPrevHash,

    #[error("broken link at index {index}: prev_hash does not match")]
    BrokenLink { index: usize },

    #[error("missing prev_hash at index {index} (should reference previous entry)")]
    MissingPrevHash { index: usize },

    #[error("hash mismatch at index {index}: computed hash differs from stored")]
    HashMismatch { index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestEntry {
        hash: [u8; 32],
        prev: Option<[u8; 32]>,
        payload: Vec<u8>,
    }

    impl HasEntryHash for TestEntry {
        fn entry_hash(&self) -> [u8; 32] {
            self.hash
        }
        fn prev_hash(&self) -> Option<[u8; 32]> {
            self.prev
        }
        fn payload_bytes(&self) -> Vec<u8> {
            self.payload.clone()
        }
    }

    fn build_chain(count: usize) -> Vec<TestEntry> {
        let mut chain = Vec::new();
        let mut prev_hash: Option<[u8; 32]> = None;

        for i in 0..count {
            let payload = format!("entry-{i}").into_bytes();
            let hash = HashChainVerifier::compute_hash(&payload, prev_hash);
            chain.push(TestEntry {
                hash,
                prev: prev_hash,
                payload,
            });
            prev_hash = Some(hash);
        }

        chain
    }

    #[test]
    fn empty_chain_is_valid() {
        let chain: Vec<TestEntry> = vec![];
        assert!(HashChainVerifier::verify_chain(&chain).is_ok());
    }

    #[test]
    fn multi_entry_chain() {
        let chain = build_chain(10);
        assert!(HashChainVerifier::verify_chain(&chain).is_ok());
    }

    #[test]
    fn genesis_with_prev_hash_fails() {
        let mut chain = build_chain(1);
        chain[0].prev = Some([1; 32]);
        let err = HashChainVerifier::verify_chain(&chain).unwrap_err();
        assert_eq!(err, ChainError::GenesisHasPrevHash);
    }

    #[test]
    fn broken_link_detected() {
        let mut chain = build_chain(3);
        chain[2].prev = Some([99; 32]);
        let err = HashChainVerifier::verify_chain(&chain).unwrap_err();
        assert_eq!(err, ChainError::BrokenLink { index: 2 });
    }

    #[test]
    fn missing_prev_hash_detected() {
        let mut chain = build_chain(3);
        chain[1].prev = None;
        let err = HashChainVerifier::verify_chain(&chain).unwrap_err();
        assert_eq!(err, ChainError::MissingPrevHash { index: 1 });
    }

    #[test]
    fn tampered_payload_detected() {
        let mut chain = build_chain(3);
        chain[1].payload = b"tampered".to_vec();
        let err = HashChainVerifier::verify_chain(&chain).unwrap_err();
        assert_eq!(err, ChainError::HashMismatch { index: 1 });
    }
}
