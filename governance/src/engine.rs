//! Governance engine: the single entry point wiring the components together.

use crate::error::GovernanceError;
use crate::ledger::VoteLedger;
use crate::locks::KeyedLocks;
use crate::proposals::{load_proposal, NewProposal, ProposalRegistry};
use crate::registry::{DaoRegistry, NewDao, NewMember};
use crate::scheduler::{LifecycleScheduler, StepOutcome, SweepReport};
use crate::tally::Tally;
use crate::view::ProposalView;
use daoship_store::GovernanceStore;
use daoship_types::{
    Dao, DaoId, Proposal, ProposalId, ProposalStatus, SharedClock, Vote, VoteChoice,
    WalletAddress,
};
use std::sync::Arc;
use tracing::debug;

/// Owns one store and one clock; every component shares them, and the proposal
/// registry, ledger and scheduler share one table of per-proposal locks.
pub struct GovernanceEngine<S> {
    store: Arc<S>,
    clock: SharedClock,
    daos: DaoRegistry<S>,
    proposals: Arc<ProposalRegistry<S>>,
    ledger: VoteLedger<S>,
    scheduler: LifecycleScheduler<S>,
}

impl<S: GovernanceStore> GovernanceEngine<S> {
    pub fn new(store: Arc<S>, clock: SharedClock) -> Self {
        let locks = Arc::new(KeyedLocks::new());
        let proposals = Arc::new(ProposalRegistry::new(
            Arc::clone(&store),
            Arc::clone(&clock),
            Arc::clone(&locks),
        ));
        Self {
            daos: DaoRegistry::new(Arc::clone(&store), Arc::clone(&clock)),
            ledger: VoteLedger::new(Arc::clone(&store), Arc::clone(&clock), locks),
            scheduler: LifecycleScheduler::new(
                Arc::clone(&store),
                Arc::clone(&clock),
                Arc::clone(&proposals),
            ),
            proposals,
            store,
            clock,
        }
    }

    // DAOs

    pub fn create_dao(&self, new: NewDao) -> Result<Dao, GovernanceError> {
        self.daos.create(new)
    }

    pub fn get_dao(&self, id: &DaoId) -> Result<Dao, GovernanceError> {
        self.daos.get(id)
    }

    pub fn list_daos(&self) -> Result<Vec<Dao>, GovernanceError> {
        self.daos.list()
    }

    pub fn join_dao(&self, id: &DaoId, member: NewMember) -> Result<Dao, GovernanceError> {
        self.daos.join(id, member)
    }

    pub fn leave_dao(&self, id: &DaoId, address: &WalletAddress) -> Result<Dao, GovernanceError> {
        self.daos.leave(id, address)
    }

    // Proposals

    pub fn create_proposal(&self, new: NewProposal) -> Result<Proposal, GovernanceError> {
        self.proposals.create(new)
    }

    pub fn get_proposal(&self, id: &ProposalId) -> Result<Proposal, GovernanceError> {
        self.proposals.get(id)
    }

    pub fn list_proposals(
        &self,
        dao_id: &DaoId,
        status: Option<ProposalStatus>,
    ) -> Result<Vec<Proposal>, GovernanceError> {
        self.proposals.list(dao_id, status)
    }

    /// The proposal with its derived tally, resolution and countdown.
    pub fn view_proposal(&self, id: &ProposalId) -> Result<ProposalView, GovernanceError> {
        let proposal = load_proposal(self.store.as_ref(), id)?;
        let votes = self.store.get_votes(id)?;
        let view = ProposalView::new(proposal, &votes, self.clock.now());
        debug!(summary = %view.summary(), "proposal view");
        Ok(view)
    }

    // Votes

    /// Cast a vote with the voter's registered member weight. Callers holding an
    /// externally verified weight go through [`VoteLedger::cast_vote`] instead.
    pub fn cast_vote(
        &self,
        proposal_id: &ProposalId,
        voter: &WalletAddress,
        choice: VoteChoice,
    ) -> Result<Vote, GovernanceError> {
        self.ledger.cast_member_vote(proposal_id, voter, choice)
    }

    pub fn get_votes(&self, proposal_id: &ProposalId) -> Result<Vec<Vote>, GovernanceError> {
        self.ledger.get_votes(proposal_id)
    }

    pub fn has_voted(
        &self,
        proposal_id: &ProposalId,
        voter: &WalletAddress,
    ) -> Result<bool, GovernanceError> {
        self.ledger.has_voted(proposal_id, voter)
    }

    pub fn tally(&self, proposal_id: &ProposalId) -> Result<Tally, GovernanceError> {
        Ok(Tally::from_votes(&self.ledger.get_votes(proposal_id)?))
    }

    // Lifecycle

    pub fn sweep(&self) -> Result<SweepReport, GovernanceError> {
        self.scheduler.sweep()
    }

    pub fn finalize(&self, id: &ProposalId) -> Result<StepOutcome, GovernanceError> {
        self.scheduler.finalize(id)
    }

    // Components

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    pub fn daos(&self) -> &DaoRegistry<S> {
        &self.daos
    }

    pub fn proposals(&self) -> &ProposalRegistry<S> {
        &self.proposals
    }

    pub fn ledger(&self) -> &VoteLedger<S> {
        &self.ledger
    }

    pub fn scheduler(&self) -> &LifecycleScheduler<S> {
        &self.scheduler
    }
}
