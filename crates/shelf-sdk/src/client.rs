use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shelf_ledger::{
    InMemoryLedger, JournalEntry, LedgerError, LedgerEvent, LedgerInfo, Operation, ReplayEngine,
};
use shelf_types::{AccountId, BookKey};
use tracing::{debug, info, warn};

use crate::config::{SdkConfig, LOCAL_NETWORK};
use crate::endpoint::{InProcessEndpoint, LedgerEndpoint, Resolution, SubmissionId};
use crate::error::{SdkError, SdkResult};
use crate::journal_file::{load_journal, save_journal};

/// A confirmed mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub submission: SubmissionId,
    pub entry: JournalEntry,
}

impl Receipt {
    pub fn event(&self) -> &LedgerEvent {
        &self.entry.event
    }
}

/// One catalog record with its key, as listed by [`ShelfClient::all_books`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSummary {
    pub key: BookKey,
    pub title: String,
    pub copies: u64,
    pub borrowers: Vec<AccountId>,
}

impl BookSummary {
    pub fn is_available(&self) -> bool {
        self.copies > 0
    }
}

/// Outcome of a journal audit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    pub entries: u64,
    pub head: Option<[u8; 32]>,
    /// Whether replaying the journal reproduces the live catalog.
    pub converged: bool,
}

/// Client acting as one account against a ledger endpoint.
pub struct ShelfClient {
    endpoint: Arc<dyn LedgerEndpoint>,
    account: AccountId,
    config: SdkConfig,
}

impl ShelfClient {
    /// Open the endpoint named by `config.network`.
    ///
    /// For the local network the ledger is restored from
    /// `config.journal_path` when that file exists.
    pub fn connect(config: SdkConfig) -> SdkResult<Self> {
        if config.network != LOCAL_NETWORK {
            return Err(SdkError::UnsupportedNetwork(config.network));
        }
        let owner: AccountId = config.owner.parse()?;
        let account: AccountId = config.account.parse()?;

        let ledger = match &config.journal_path {
            Some(path) if path.exists() => InMemoryLedger::restore(owner, load_journal(path)?)?,
            _ => InMemoryLedger::new(owner),
        };
        info!(network = %config.network, account = %account, "client connected");

        let endpoint = InProcessEndpoint::new(Arc::new(ledger));
        Ok(Self::with_endpoint(Arc::new(endpoint), account, config))
    }

    pub fn with_endpoint(
        endpoint: Arc<dyn LedgerEndpoint>,
        account: AccountId,
        config: SdkConfig,
    ) -> Self {
        Self {
            endpoint,
            account,
            config,
        }
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    // ---- Mutations ----

    pub async fn add_book(&self, title: &str, copies: u64) -> SdkResult<Receipt> {
        self.confirm(Operation::add_book(self.account, title, copies))
            .await
    }

    pub async fn borrow_book(&self, key: &BookKey) -> SdkResult<Receipt> {
        self.confirm(Operation::borrow_book(self.account, *key)).await
    }

    pub async fn return_book(&self, key: &BookKey) -> SdkResult<Receipt> {
        self.confirm(Operation::return_book(self.account, *key)).await
    }

    /// Submit and poll until the operation is applied or rejected.
    async fn confirm(&self, operation: Operation) -> SdkResult<Receipt> {
        let submission = self.endpoint.submit(operation).await?;
        debug!(submission = %submission, "awaiting confirmation");

        let timeout = self.config.confirmation_timeout();
        let waited = tokio::time::timeout(timeout, self.wait_for(submission)).await;
        match waited {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    submission = %submission,
                    timeout_ms = self.config.confirmation_timeout_ms,
                    "confirmation timed out"
                );
                if let Err(e) = self.endpoint.abandon(&submission).await {
                    warn!(submission = %submission, error = %e, "abandon failed");
                }
                Err(SdkError::ConfirmationTimeout {
                    id: submission.to_string(),
                    timeout_ms: self.config.confirmation_timeout_ms,
                })
            }
        }
    }

    async fn wait_for(&self, submission: SubmissionId) -> SdkResult<Receipt> {
        let mut interval = tokio::time::interval(self.config.poll_interval());
        loop {
            interval.tick().await;
            match self.endpoint.poll(&submission).await? {
                Resolution::Pending => continue,
                Resolution::Applied(entry) => return Ok(Receipt { submission, entry }),
                Resolution::Rejected(e) => return Err(e.into()),
            }
        }
    }

    // ---- Queries ----

    pub async fn book(&self, key: &BookKey) -> SdkResult<BookSummary> {
        let book = self.endpoint.book(key).await?;
        Ok(BookSummary {
            key: *key,
            title: book.title,
            copies: book.copies,
            borrowers: book.borrowers,
        })
    }

    pub async fn borrowers(&self, key: &BookKey) -> SdkResult<Vec<AccountId>> {
        self.endpoint.borrowers(key).await
    }

    /// Discover keys by probing `key_at(0..)` until the index runs out,
    /// stopping early at `scan_limit`.
    pub async fn all_keys(&self) -> SdkResult<Vec<BookKey>> {
        let mut keys = Vec::new();
        let mut index = 0;
        while self.config.scan_limit.map_or(true, |limit| index < limit) {
            match self.endpoint.key_at(index).await {
                Ok(key) => keys.push(key),
                Err(SdkError::Ledger(LedgerError::IndexOutOfRange { .. })) => break,
                Err(e) => return Err(e),
            }
            index += 1;
        }
        Ok(keys)
    }

    /// Like [`ShelfClient::all_keys`], but sized by `key_count` up front.
    pub async fn all_keys_counted(&self) -> SdkResult<Vec<BookKey>> {
        let mut count = self.endpoint.key_count().await?;
        if let Some(limit) = self.config.scan_limit {
            count = count.min(limit);
        }
        let mut keys = Vec::with_capacity(count);
        for index in 0..count {
            keys.push(self.endpoint.key_at(index).await?);
        }
        Ok(keys)
    }

    pub async fn all_books(&self) -> SdkResult<Vec<BookSummary>> {
        let mut books = Vec::new();
        for key in self.all_keys().await? {
            books.push(self.book(&key).await?);
        }
        Ok(books)
    }

    pub async fn available_books(&self) -> SdkResult<Vec<BookSummary>> {
        let mut books = self.all_books().await?;
        books.retain(BookSummary::is_available);
        Ok(books)
    }

    /// Whether `key` names a book with a copy on the shelf; false if unknown.
    pub async fn is_available(&self, key: &BookKey) -> SdkResult<bool> {
        match self.endpoint.book(key).await {
            Ok(book) => Ok(book.is_available()),
            Err(SdkError::Ledger(LedgerError::NotFound { .. })) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Whether this client's account currently holds a copy of `key`.
    pub async fn has_borrowed(&self, key: &BookKey) -> SdkResult<bool> {
        Ok(self.endpoint.borrowers(key).await?.contains(&self.account))
    }

    pub async fn info(&self) -> SdkResult<LedgerInfo> {
        self.endpoint.info().await
    }

    pub async fn journal(&self) -> SdkResult<Vec<JournalEntry>> {
        self.endpoint.journal().await
    }

    // ---- Audit and persistence ----

    /// Verify the journal chain and check that replaying it reproduces the
    /// catalog the endpoint reports.
    pub async fn audit(&self) -> SdkResult<AuditReport> {
        let info = self.endpoint.info().await?;
        let replayed = ReplayEngine::replay(info.owner, self.endpoint.journal().await?)?;

        let mut live = Vec::new();
        for index in 0..self.endpoint.key_count().await? {
            let key = self.endpoint.key_at(index).await?;
            live.push((key, self.endpoint.book(&key).await?));
        }
        let converged = replayed.matches(&live);
        if !converged {
            warn!(entries = replayed.applied, "journal replay does not match live catalog");
        }

        Ok(AuditReport {
            entries: replayed.applied,
            head: replayed.journal.head(),
            converged,
        })
    }

    /// Write the journal to `config.journal_path`, if one is configured.
    pub async fn persist(&self) -> SdkResult<bool> {
        let Some(path) = &self.config.journal_path else {
            return Ok(false);
        };
        save_journal(path, &self.endpoint.journal().await?)?;
        Ok(true)
    }
}
