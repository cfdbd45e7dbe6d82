//! Proposal storage trait.

use crate::StoreError;
use daoship_types::{DaoId, Proposal, ProposalId, ProposalStatus};

pub trait ProposalStore {
    /// Allocate the next unused proposal id.
    fn next_proposal_id(&self) -> Result<ProposalId, StoreError>;

    /// Store a new proposal. Fails with [`StoreError::Duplicate`] if the id is taken.
    fn insert_proposal(&self, proposal: &Proposal) -> Result<(), StoreError>;

    /// Get a proposal by id.
    fn get_proposal(&self, id: &ProposalId) -> Result<Proposal, StoreError>;

    /// All proposals of a DAO, in no particular order.
    fn list_proposals(&self, dao_id: &DaoId) -> Result<Vec<Proposal>, StoreError>;

    /// Proposals whose stored status is `Pending` or `Active`.
    fn list_open_proposals(&self) -> Result<Vec<Proposal>, StoreError>;

    /// Atomically replace the status of `id` with `new` if it currently equals
    /// `expected`. Returns `false` (and writes nothing) when it does not.
    fn compare_and_set_status(
        &self,
        id: &ProposalId,
        expected: ProposalStatus,
        new: ProposalStatus,
    ) -> Result<bool, StoreError>;
}
