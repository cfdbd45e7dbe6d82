//! Fundamental types for the DAOship governance service.
//!
//! This crate defines the records shared across every other crate in the workspace:
//! wallet addresses, identifiers, timestamps and clocks, DAOs with their governance
//! configuration, proposals with their lifecycle status, and votes.

pub mod address;
pub mod dao;
pub mod error;
pub mod ids;
pub mod proposal;
pub mod time;
pub mod vote;

pub use address::WalletAddress;
pub use dao::{Dao, GovernanceConfig, Member, TokenInfo, Weight, MAX_VOTING_PERIOD_DAYS};
pub use error::TypesError;
pub use ids::{DaoId, ProposalId};
pub use proposal::{Proposal, ProposalStatus};
pub use time::{Clock, SharedClock, SystemClock, Timestamp, SECS_PER_DAY, SECS_PER_HOUR};
pub use vote::{Vote, VoteChoice};
