use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::strip_hex_prefix;

/// Length in bytes of an account identifier.
pub const ACCOUNT_LEN: usize = 20;

/// Identifier of an account acting on the ledger.
///
/// The ledger never verifies an `AccountId`; the host asserts it and the
/// ledger uses it for ownership and borrower-membership checks only.
///
/// An id is either parsed from `0x`-prefixed hex or derived from a
/// human-readable label with domain-separated BLAKE3 truncated to 20 bytes.
/// The same label always produces the same account.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId([u8; ACCOUNT_LEN]);

impl AccountId {
    /// Derive an account from a label such as `"alice"`.
    pub fn from_label(label: &str) -> Result<Self, TypeError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(TypeError::EmptyLabel);
        }
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"shelf-account-v1:");
        hasher.update(label.as_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; ACCOUNT_LEN];
        bytes.copy_from_slice(&digest.as_bytes()[..ACCOUNT_LEN]);
        Ok(Self(bytes))
    }

    /// Create a random account for tests and demos.
    pub fn ephemeral() -> Self {
        let mut bytes = [0u8; ACCOUNT_LEN];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_raw(bytes: [u8; ACCOUNT_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ACCOUNT_LEN] {
        &self.0
    }

    /// `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// First four bytes, for log lines.
    pub fn short_id(&self) -> String {
        format!("0x{}", hex::encode(&self.0[..4]))
    }

    /// Parse from hex, with or without a `0x`/`0X` prefix.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let s = strip_hex_prefix(s).unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != ACCOUNT_LEN {
            return Err(TypeError::InvalidLength {
                expected: ACCOUNT_LEN,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; ACCOUNT_LEN];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

/// `0x…` and `0X…` strings parse as hex, anything else is treated as a label.
impl FromStr for AccountId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if strip_hex_prefix(s).is_some() {
            Self::from_hex(s)
        } else {
            Self::from_label(s)
        }
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.short_id())
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_derivation_is_deterministic() {
        let a = AccountId::from_label("alice").unwrap();
        let b = AccountId::from_label("alice").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_labels_produce_different_accounts() {
        let alice = AccountId::from_label("alice").unwrap();
        let bob = AccountId::from_label("bob").unwrap();
        assert_ne!(alice, bob);
    }

    #[test]
    fn label_is_trimmed() {
        let a = AccountId::from_label("  alice ").unwrap();
        assert_eq!(a, AccountId::from_label("alice").unwrap());
    }

    #[test]
    fn empty_label_is_rejected() {
        assert_eq!(AccountId::from_label("   ").unwrap_err(), TypeError::EmptyLabel);
    }

    #[test]
    fn ephemeral_accounts_are_unique() {
        assert_ne!(AccountId::ephemeral(), AccountId::ephemeral());
    }

    #[test]
    fn hex_format() {
        let id = AccountId::from_raw([0xab; ACCOUNT_LEN]);
        let hex = id.to_hex();
        assert!(hex.starts_with("0x"));
        assert_eq!(hex.len(), 2 + ACCOUNT_LEN * 2);
        assert_eq!(id.short_id(), "0xabababab");
    }

    #[test]
    fn hex_parse_accepts_both_forms() {
        let id = AccountId::from_label("carol").unwrap();
        assert_eq!(AccountId::from_hex(&id.to_hex()).unwrap(), id);
        assert_eq!(AccountId::from_hex(&id.to_hex()[2..]).unwrap(), id);
    }

    #[test]
    fn hex_parse_rejects_wrong_length() {
        let err = AccountId::from_hex("0xabcd").unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidLength {
                expected: ACCOUNT_LEN,
                actual: 2
            }
        );
    }

    #[test]
    fn from_str_dispatches_on_prefix() {
        let alice = AccountId::from_label("alice").unwrap();
        assert_eq!("alice".parse::<AccountId>().unwrap(), alice);
        assert_eq!(alice.to_hex().parse::<AccountId>().unwrap(), alice);
        assert!("0xzz".parse::<AccountId>().is_err());
    }

    #[test]
    fn uppercase_prefix_parses_as_hex() {
        let alice = AccountId::from_label("alice").unwrap();
        let upper = format!("0X{}", hex::encode_upper(alice.as_bytes()));
        assert_eq!(upper.parse::<AccountId>().unwrap(), alice);
        assert_eq!(AccountId::from_hex(&upper).unwrap(), alice);
        assert!("0Xzz".parse::<AccountId>().is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let id = AccountId::from_label("dave").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        let parsed: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }
}
