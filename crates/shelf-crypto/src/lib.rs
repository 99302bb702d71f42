//! Hashing primitives for the Shelf lending ledger.
//!
//! Provides domain-separated BLAKE3 hashing (book keys, journal payloads)
//! and hash chain verification for the operation journal.
//!
//! All crypto operations wrap established libraries; there is no custom cryptography.

pub mod chain;
pub mod hasher;

pub use chain::{ChainError, HasEntryHash, HashChainVerifier};
pub use hasher::ContentHasher;
