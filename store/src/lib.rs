//! Abstract storage traits for the DAOship governance service.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these traits.
//! The rest of the codebase depends only on the traits.
//!
//! Two operations carry atomicity requirements every backend must honour:
//! [`VoteStore::insert_vote`] rejects a second vote for the same
//! `(proposal, voter)` key, and [`ProposalStore::compare_and_set_status`] only
//! writes when the stored status still matches the expected one.

pub mod dao;
pub mod error;
pub mod proposal;
pub mod retry;
pub mod vote;

pub use dao::DaoStore;
pub use error::StoreError;
pub use proposal::ProposalStore;
pub use retry::{RetryPolicy, RetryingStore};
pub use vote::VoteStore;

/// Everything the governance engine needs from persistence.
pub trait GovernanceStore: DaoStore + ProposalStore + VoteStore + Send + Sync {}

impl<T> GovernanceStore for T where T: DaoStore + ProposalStore + VoteStore + Send + Sync {}
