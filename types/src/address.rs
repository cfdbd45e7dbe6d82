//! Wallet address type.

use crate::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A wallet address as supplied by the identity provider.
///
/// The engine trusts that the address has been verified upstream; it only checks that
/// the string is a plausible address so it can be used as a storage key.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddress(String);

impl WalletAddress {
    pub const MAX_LEN: usize = 128;

    /// Validate and wrap a raw address string.
    pub fn parse(raw: impl Into<String>) -> Result<Self, TypesError> {
        let s = raw.into();
        let well_formed = !s.is_empty()
            && s.len() <= Self::MAX_LEN
            && s
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
        if well_formed {
            Ok(Self(s))
        } else {
            Err(TypesError::InvalidAddress(s))
        }
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shortened form for display, e.g. `ABCDEF...WXYZ`.
    pub fn abbreviated(&self) -> String {
        if self.0.len() <= 12 {
            return self.0.clone();
        }
        format!("{}...{}", &self.0[..6], &self.0[self.0.len() - 4..])
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WalletAddress {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<WalletAddress> for String {
    fn from(addr: WalletAddress) -> Self {
        addr.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_spaces() {
        assert!(WalletAddress::parse("").is_err());
        assert!(WalletAddress::parse("abc def").is_err());
        assert!(WalletAddress::parse("x".repeat(129)).is_err());
    }

    #[test]
    fn abbreviates_long_addresses() {
        let addr = WalletAddress::parse("ALGOADDRESS1234567890WXYZ").unwrap();
        assert_eq!(addr.abbreviated(), "ALGOAD...WXYZ");
        let short = WalletAddress::parse("alice").unwrap();
        assert_eq!(short.abbreviated(), "alice");
    }

    #[test]
    fn deserialize_validates() {
        let ok: Result<WalletAddress, _> = serde_json::from_str("\"voter_1\"");
        assert!(ok.is_ok());
        let bad: Result<WalletAddress, _> = serde_json::from_str("\"no way\"");
        assert!(bad.is_err());
    }
}
