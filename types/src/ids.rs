//! Store-allocated identifiers for DAOs and proposals.
//!
//! Identifiers are sequential integers. They render with a kind prefix (`dao-7`,
//! `prop-42`) and parse from either that form or the bare integer.

use crate::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! sequential_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(u64);

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            pub fn new(n: u64) -> Self {
                Self(n)
            }

            pub fn get(&self) -> u64 {
                self.0
            }

            /// Big-endian key bytes; sorts the same way as the id.
            pub fn to_be_bytes(&self) -> [u8; 8] {
                self.0.to_be_bytes()
            }

            pub fn from_be_bytes(bytes: [u8; 8]) -> Self {
                Self(u64::from_be_bytes(bytes))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", Self::PREFIX, self.0)
            }
        }

        impl FromStr for $name {
            type Err = TypesError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.strip_prefix(Self::PREFIX)
                    .unwrap_or(s)
                    .parse::<u64>()
                    .map(Self)
                    .map_err(|_| TypesError::InvalidId(s.to_string()))
            }
        }
    };
}

sequential_id!(
    /// Identifier of a DAO.
    DaoId,
    "dao-"
);

sequential_id!(
    /// Identifier of a proposal, unique across all DAOs.
    ProposalId,
    "prop-"
);
