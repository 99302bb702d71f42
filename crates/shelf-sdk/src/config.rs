use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};

/// Network name of the built-in in-process ledger.
pub const LOCAL_NETWORK: &str = "local";

/// Client configuration, usually read from a `shelf.toml`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
    pub network: String,
    /// Label or `0x` address of the ledger owner.
    pub owner: String,
    /// Label or `0x` address the client acts as.
    pub account: String,
    pub poll_interval_ms: u64,
    pub confirmation_timeout_ms: u64,
    /// Upper bound on keys probed during enumeration.
    pub scan_limit: Option<usize>,
    /// JSON journal to restore from and save to.
    pub journal_path: Option<PathBuf>,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            network: LOCAL_NETWORK.into(),
            owner: "owner".into(),
            account: "owner".into(),
            poll_interval_ms: 10,
            confirmation_timeout_ms: 5_000,
            scan_limit: None,
            journal_path: None,
        }
    }
}

impl SdkConfig {
    pub fn load(path: impl AsRef<Path>) -> SdkResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| SdkError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> SdkResult<Self> {
        toml::from_str(text).map_err(|e| SdkError::Config(e.to_string()))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_millis(self.confirmation_timeout_ms)
    }
}
