use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("ledger error: {0}")]
    Ledger(#[from] shelf_ledger::LedgerError),

    #[error("invalid identifier: {0}")]
    Type(#[from] shelf_types::TypeError),

    #[error("submission {id} not confirmed within {timeout_ms} ms")]
    ConfirmationTimeout { id: String, timeout_ms: u64 },

    #[error("unknown submission {0}")]
    UnknownSubmission(String),

    #[error("unsupported network: {0}")]
    UnsupportedNetwork(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("journal file error: {0}")]
    Journal(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SdkError {
    /// The ledger's refusal, if this error is one.
    pub fn rejection(&self) -> Option<&shelf_ledger::LedgerError> {
        match self {
            Self::Ledger(e) if e.is_rejection() => Some(e),
            _ => None,
        }
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
