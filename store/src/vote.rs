//! Vote storage trait.

use crate::StoreError;
use daoship_types::{ProposalId, Vote, WalletAddress};

pub trait VoteStore {
    /// Append a vote. Fails with [`StoreError::Duplicate`] if the voter already has a
    /// vote on the proposal; the existing vote is left untouched.
    fn insert_vote(&self, vote: &Vote) -> Result<(), StoreError>;

    /// All votes cast on a proposal.
    fn get_votes(&self, proposal: &ProposalId) -> Result<Vec<Vote>, StoreError>;

    /// Whether `voter` has a vote on `proposal`.
    fn has_vote(&self, proposal: &ProposalId, voter: &WalletAddress) -> Result<bool, StoreError>;
}
