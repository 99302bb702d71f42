use serde::{Deserialize, Serialize};
use shelf_crypto::{ChainError, HasEntryHash, HashChainVerifier};

use crate::error::LedgerError;
use crate::event::LedgerEvent;
use crate::operation::Operation;

/// One applied operation and the event it produced, hash-linked to the
/// entry before it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Position in the journal (1-based, gap-free).
    pub seq: u64,
    pub operation: Operation,
    pub event: LedgerEvent,
    pub prev_hash: Option<[u8; 32]>,
    pub entry_hash: [u8; 32],
}

impl JournalEntry {
    fn seal(
        seq: u64,
        operation: Operation,
        event: LedgerEvent,
        prev_hash: Option<[u8; 32]>,
    ) -> Result<Self, LedgerError> {
        let payload = encode_payload(seq, &operation, &event)?;
        let entry_hash = HashChainVerifier::compute_hash(&payload, prev_hash);
        Ok(Self {
            seq,
            operation,
            event,
            prev_hash,
            entry_hash,
        })
    }

    pub fn short_hash(&self) -> String {
        hex::encode(&self.entry_hash[..4])
    }
}

impl HasEntryHash for JournalEntry {
    fn entry_hash(&self) -> [u8; 32] {
        self.entry_hash
    }

    fn prev_hash(&self) -> Option<[u8; 32]> {
        self.prev_hash
    }

    fn payload_bytes(&self) -> Vec<u8> {
        // An unencodable entry yields an empty payload and fails verification.
        encode_payload(self.seq, &self.operation, &self.event).unwrap_or_default()
    }
}

fn encode_payload(
    seq: u64,
    operation: &Operation,
    event: &LedgerEvent,
) -> Result<Vec<u8>, LedgerError> {
    serde_json::to_vec(&(seq, operation, event))
        .map_err(|e| LedgerError::Serialization(e.to_string()))
}

/// Append-only record of every applied operation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Journal {
    entries: Vec<JournalEntry>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt existing entries after verifying them.
    pub fn from_entries(entries: Vec<JournalEntry>) -> Result<Self, LedgerError> {
        verify_entries(&entries)?;
        Ok(Self { entries })
    }

    /// Build the next entry without appending it.
    pub fn prepare(
        &self,
        operation: Operation,
        event: LedgerEvent,
    ) -> Result<JournalEntry, LedgerError> {
        let seq = self.entries.len() as u64 + 1;
        JournalEntry::seal(seq, operation, event, self.head())
    }

    /// Append an entry built by [`Journal::prepare`] on this journal.
    pub fn push(&mut self, entry: JournalEntry) -> Result<(), LedgerError> {
        let expected_seq = self.entries.len() as u64 + 1;
        if entry.seq != expected_seq || entry.prev_hash != self.head() {
            return Err(LedgerError::JournalIntegrity {
                seq: entry.seq,
                reason: format!("append out of order; expected seq {expected_seq}"),
            });
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hash of the latest entry.
    pub fn head(&self) -> Option<[u8; 32]> {
        self.entries.last().map(|e| e.entry_hash)
    }

    pub fn verify(&self) -> Result<(), LedgerError> {
        verify_entries(&self.entries)
    }
}

/// Check sequence numbers and the hash chain of `entries`.
pub fn verify_entries(entries: &[JournalEntry]) -> Result<(), LedgerError> {
    for (index, entry) in entries.iter().enumerate() {
        let expected_seq = index as u64 + 1;
        if entry.seq != expected_seq {
            return Err(LedgerError::JournalIntegrity {
                seq: entry.seq,
                reason: format!("expected seq {expected_seq}, found {}", entry.seq),
            });
        }
    }

    HashChainVerifier::verify_chain(entries).map_err(|e| {
        let index = match e {
            ChainError::GenesisHasPrevHash => 0,
            ChainError::BrokenLink { index }
            | ChainError::MissingPrevHash { index }
            | ChainError::HashMismatch { index } => index,
        };
        LedgerError::JournalIntegrity {
            seq: index as u64 + 1,
            reason: e.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use shelf_types::{AccountId, BookKey};

    use super::*;

    fn owner() -> AccountId {
        AccountId::from_label("owner").unwrap()
    }

    fn append(journal: &mut Journal, seed: u8) {
        let key = BookKey::from_hash([seed; 32]);
        let entry = journal
            .prepare(
                Operation::add_book(owner(), format!("book-{seed}"), 1),
                LedgerEvent::BookAdded {
                    key,
                    title: format!("book-{seed}"),
                    copies: 1,
                },
            )
            .unwrap();
        journal.push(entry).unwrap();
    }

    #[test]
    fn entries_are_linked() {
        let mut journal = Journal::new();
        append(&mut journal, 1);
        append(&mut journal, 2);

        let entries = journal.entries();
        assert_eq!(entries[0].seq, 1);
        assert_eq!(entries[0].prev_hash, None);
        assert_eq!(entries[1].seq, 2);
        assert_eq!(entries[1].prev_hash, Some(entries[0].entry_hash));
        assert_eq!(journal.head(), Some(entries[1].entry_hash));
        journal.verify().unwrap();
    }

    #[test]
    fn stale_prepared_entry_is_refused() {
        let mut journal = Journal::new();
        let stale = journal
            .prepare(
                Operation::add_book(owner(), "x", 1),
                LedgerEvent::BookAdded {
                    key: BookKey::from_hash([9; 32]),
                    title: "x".into(),
                    copies: 1,
                },
            )
            .unwrap();
        append(&mut journal, 1);

        let err = journal.push(stale).unwrap_err();
        assert!(matches!(err, LedgerError::JournalIntegrity { seq: 1, .. }));
    }

    #[test]
    fn tampered_event_is_detected() {
        let mut journal = Journal::new();
        append(&mut journal, 1);
        append(&mut journal, 2);

        let mut entries = journal.entries().to_vec();
        if let LedgerEvent::BookAdded { copies, .. } = &mut entries[1].event {
            *copies = 99;
        }

        let err = Journal::from_entries(entries).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::JournalIntegrity { seq: 2, ref reason } if reason.contains("hash mismatch")
        ));
    }

    #[test]
    fn sequence_gap_is_detected() {
        let mut journal = Journal::new();
        append(&mut journal, 1);
        let mut entries = journal.entries().to_vec();
        entries[0].seq = 5;

        let err = verify_entries(&entries).unwrap_err();
        assert!(matches!(err, LedgerError::JournalIntegrity { seq: 5, .. }));
    }

    #[test]
    fn journal_survives_json() {
        let mut journal = Journal::new();
        append(&mut journal, 1);
        append(&mut journal, 2);

        let json = serde_json::to_string(journal.entries()).unwrap();
        let decoded: Vec<JournalEntry> = serde_json::from_str(&json).unwrap();
        assert_eq!(Journal::from_entries(decoded).unwrap(), journal);
    }
}
