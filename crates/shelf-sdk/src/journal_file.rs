//! JSON export and import of a ledger journal.

use std::path::Path;

use shelf_ledger::JournalEntry;
use tracing::debug;

use crate::error::{SdkError, SdkResult};

/// Read a journal exported by [`save_journal`].
pub fn load_journal(path: impl AsRef<Path>) -> SdkResult<Vec<JournalEntry>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let entries: Vec<JournalEntry> = serde_json::from_str(&text)
        .map_err(|e| SdkError::Journal(format!("{}: {e}", path.display())))?;
    debug!(path = %path.display(), entries = entries.len(), "journal loaded");
    Ok(entries)
}

/// Write `entries` as pretty JSON, replacing the file atomically.
pub fn save_journal(path: impl AsRef<Path>, entries: &[JournalEntry]) -> SdkResult<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(entries)
        .map_err(|e| SdkError::Journal(e.to_string()))?;

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;
    debug!(path = %path.display(), entries = entries.len(), "journal saved");
    Ok(())
}
