use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shelf_ledger::{
    Book, InMemoryLedger, JournalEntry, LedgerError, LedgerInfo, LedgerReader, LedgerWriter,
    Operation,
};
use shelf_types::{AccountId, BookKey};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::error::{SdkError, SdkResult};

/// Handle for an operation that has been submitted but maybe not applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(Uuid);

impl SubmissionId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a submission stands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Accepted for processing; not yet effective.
    Pending,
    Applied(JournalEntry),
    Rejected(LedgerError),
}

/// Asynchronous boundary between a client and a ledger host.
///
/// Mutations go through `submit` and resolve later through `poll`; reads are
/// answered directly.
#[async_trait]
pub trait LedgerEndpoint: Send + Sync {
    async fn submit(&self, operation: Operation) -> SdkResult<SubmissionId>;

    /// Current resolution of `id`. A resolved submission is reported once.
    async fn poll(&self, id: &SubmissionId) -> SdkResult<Resolution>;

    /// Give up on `id`. A still-queued operation is dropped without being
    /// applied; an unreported resolution is discarded. Returns whether the
    /// endpoint knew the id.
    async fn abandon(&self, id: &SubmissionId) -> SdkResult<bool>;

    async fn book(&self, key: &BookKey) -> SdkResult<Book>;
    async fn borrowers(&self, key: &BookKey) -> SdkResult<Vec<AccountId>>;
    async fn key_at(&self, index: usize) -> SdkResult<BookKey>;
    async fn key_count(&self) -> SdkResult<usize>;
    async fn journal(&self) -> SdkResult<Vec<JournalEntry>>;
    async fn info(&self) -> SdkResult<LedgerInfo>;
}

#[derive(Default)]
struct Queue {
    pending: VecDeque<(SubmissionId, Operation)>,
    resolved: HashMap<SubmissionId, Resolution>,
}

/// Endpoint backed by an `InMemoryLedger` in the same process.
///
/// Submissions are queued in arrival order and stay pending until the next
/// poll, which applies every queued submission in order before answering.
/// Resolutions are held until polled or abandoned.
pub struct InProcessEndpoint {
    ledger: Arc<InMemoryLedger>,
    queue: Mutex<Queue>,
}

impl InProcessEndpoint {
    pub fn new(ledger: Arc<InMemoryLedger>) -> Self {
        Self {
            ledger,
            queue: Mutex::new(Queue::default()),
        }
    }

    pub fn ledger(&self) -> &Arc<InMemoryLedger> {
        &self.ledger
    }

    /// Number of submissions waiting to be applied.
    pub async fn queued(&self) -> usize {
        self.queue.lock().await.pending.len()
    }

    fn drain_pending(&self, queue: &mut Queue) {
        while let Some((id, operation)) = queue.pending.pop_front() {
            let resolution = match self.ledger.submit(&operation) {
                Ok(entry) => Resolution::Applied(entry),
                Err(e) => Resolution::Rejected(e),
            };
            debug!(
                submission = %id,
                op = operation.name(),
                applied = matches!(resolution, Resolution::Applied(_)),
                "submission resolved"
            );
            queue.resolved.insert(id, resolution);
        }
    }

    #[cfg(test)]
    async fn unreported(&self) -> usize {
        self.queue.lock().await.resolved.len()
    }
}

#[async_trait]
impl LedgerEndpoint for InProcessEndpoint {
    async fn submit(&self, operation: Operation) -> SdkResult<SubmissionId> {
        let id = SubmissionId::new();
        debug!(submission = %id, op = operation.name(), "submission queued");
        self.queue.lock().await.pending.push_back((id, operation));
        Ok(id)
    }

    async fn poll(&self, id: &SubmissionId) -> SdkResult<Resolution> {
        let mut queue = self.queue.lock().await;
        self.drain_pending(&mut queue);

        if let Some(resolution) = queue.resolved.remove(id) {
            return Ok(resolution);
        }
        if queue.pending.iter().any(|(queued, _)| queued == id) {
            return Ok(Resolution::Pending);
        }
        Err(SdkError::UnknownSubmission(id.to_string()))
    }

    async fn abandon(&self, id: &SubmissionId) -> SdkResult<bool> {
        let mut queue = self.queue.lock().await;
        if let Some(pos) = queue.pending.iter().position(|(queued, _)| queued == id) {
            queue.pending.remove(pos);
            debug!(submission = %id, "queued submission abandoned");
            return Ok(true);
        }
        let known = queue.resolved.remove(id).is_some();
        if known {
            debug!(submission = %id, "unreported resolution dropped");
        }
        Ok(known)
    }

    async fn book(&self, key: &BookKey) -> SdkResult<Book> {
        Ok(self.ledger.book(key)?)
    }

    async fn borrowers(&self, key: &BookKey) -> SdkResult<Vec<AccountId>> {
        Ok(self.ledger.borrowers(key)?)
    }

    async fn key_at(&self, index: usize) -> SdkResult<BookKey> {
        Ok(self.ledger.key_at(index)?)
    }

    async fn key_count(&self) -> SdkResult<usize> {
        Ok(self.ledger.key_count()?)
    }

    async fn journal(&self) -> SdkResult<Vec<JournalEntry>> {
        Ok(self.ledger.journal()?)
    }

    async fn info(&self) -> SdkResult<LedgerInfo> {
        Ok(self.ledger.info()?)
    }
}
