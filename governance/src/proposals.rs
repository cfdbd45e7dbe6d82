//! Proposal store: creation, reads and guarded status transitions.

use crate::error::GovernanceError;
use crate::locks::KeyedLocks;
use crate::registry::load_dao;
use crate::resolver;
use crate::tally::Tally;
use daoship_store::{GovernanceStore, ProposalStore, StoreError};
use daoship_types::{
    DaoId, GovernanceConfig, Proposal, ProposalId, ProposalStatus, SharedClock, Timestamp,
    WalletAddress,
};
use std::sync::Arc;
use tracing::{debug, info};

const MAX_TITLE_LEN: usize = 200;

/// Caller-supplied fields of a new proposal.
#[derive(Clone, Debug)]
pub struct NewProposal {
    pub dao_id: DaoId,
    pub creator: WalletAddress,
    pub title: String,
    pub description: String,
    /// Defaults to the DAO's voting period.
    pub voting_period_days: Option<u32>,
}

pub struct ProposalRegistry<S> {
    store: Arc<S>,
    clock: SharedClock,
    locks: Arc<KeyedLocks<ProposalId>>,
}

impl<S: GovernanceStore> ProposalRegistry<S> {
    pub fn new(store: Arc<S>, clock: SharedClock, locks: Arc<KeyedLocks<ProposalId>>) -> Self {
        Self {
            store,
            clock,
            locks,
        }
    }

    /// Open a proposal for voting.
    ///
    /// The creator must be a member whose weight meets the DAO's participation
    /// minimum. Quorum and eligible weight are snapshotted from the DAO so later
    /// membership or config changes cannot move the goalposts.
    pub fn create(&self, new: NewProposal) -> Result<Proposal, GovernanceError> {
        let title = new.title.trim();
        if title.is_empty() || title.len() > MAX_TITLE_LEN {
            return Err(GovernanceError::InvalidProposal(format!(
                "title must be 1..={MAX_TITLE_LEN} characters"
            )));
        }

        let dao = load_dao(self.store.as_ref(), &new.dao_id)?;
        let weight = dao.weight_of(&new.creator);
        if !dao.is_eligible(weight) {
            return Err(GovernanceError::NotEligible {
                have: weight,
                need: dao.config.min_tokens_to_participate,
            });
        }

        let max = dao.config.max_voting_period_days();
        let days = new.voting_period_days.unwrap_or(dao.config.voting_period_days);
        if days < 1 || days > max {
            return Err(GovernanceError::InvalidPeriod { days, max });
        }

        let now = self.clock.now();
        let delay = dao.config.voting_delay_secs();
        let start_time = now.plus_secs(delay);
        let end_time = start_time.plus_secs(GovernanceConfig::period_secs(days));
        let status = if delay == 0 {
            ProposalStatus::Active
        } else {
            ProposalStatus::Pending
        };

        let proposal = Proposal {
            id: self.store.next_proposal_id()?,
            dao_id: dao.id,
            title: title.to_string(),
            description: new.description,
            creator: new.creator,
            created_at: now,
            start_time,
            end_time,
            status,
            quorum_percent: dao.config.quorum_percent,
            eligible_weight: dao.total_eligible_weight(),
        };
        self.store.insert_proposal(&proposal)?;
        info!(
            proposal = %proposal.id,
            dao = %proposal.dao_id,
            creator = %proposal.creator,
            %status,
            ends = %proposal.end_time,
            "proposal created"
        );
        Ok(proposal)
    }

    /// Get a proposal with its effective status at the current time.
    pub fn get(&self, id: &ProposalId) -> Result<Proposal, GovernanceError> {
        let proposal = self.load_stored(id)?;
        self.with_effective_status(proposal, self.clock.now())
    }

    /// Proposals of a DAO, newest first, optionally restricted to one effective status.
    pub fn list(
        &self,
        dao_id: &DaoId,
        status: Option<ProposalStatus>,
    ) -> Result<Vec<Proposal>, GovernanceError> {
        load_dao(self.store.as_ref(), dao_id)?;
        let now = self.clock.now();
        let mut proposals = self
            .store
            .list_proposals(dao_id)?
            .into_iter()
            .map(|p| self.with_effective_status(p, now))
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(wanted) = status {
            proposals.retain(|p| p.status == wanted);
        }
        proposals.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        debug!(dao = %dao_id, count = proposals.len(), "listed proposals");
        Ok(proposals)
    }

    /// The record exactly as persisted, without lazy resolution.
    pub(crate) fn load_stored(&self, id: &ProposalId) -> Result<Proposal, GovernanceError> {
        load_proposal(self.store.as_ref(), id)
    }

    /// Replace the stored status with the one the resolver reports at `now`.
    pub(crate) fn with_effective_status(
        &self,
        mut proposal: Proposal,
        now: Timestamp,
    ) -> Result<Proposal, GovernanceError> {
        if resolver::transition_due(&proposal, now) {
            let tally = if now >= proposal.end_time {
                Tally::from_votes(&self.store.get_votes(&proposal.id)?)
            } else {
                Tally::default()
            };
            proposal.status = resolver::effective_status(&proposal, &tally, now);
        }
        Ok(proposal)
    }

    /// Move a proposal along the lifecycle. Returns `false` when a concurrent writer
    /// changed the status first, in which case nothing was written.
    ///
    /// Only the scheduler calls this, while holding the proposal's lock.
    pub(crate) fn transition_status(
        &self,
        id: &ProposalId,
        new: ProposalStatus,
    ) -> Result<bool, GovernanceError> {
        let current = self.load_stored(id)?.status;
        if !current.can_transition_to(new) {
            return Err(GovernanceError::InvalidTransition {
                from: current,
                to: new,
            });
        }
        let applied = self.store.compare_and_set_status(id, current, new)?;
        if applied {
            info!(proposal = %id, from = %current, to = %new, "proposal status changed");
        }
        Ok(applied)
    }

    pub(crate) fn locks(&self) -> &KeyedLocks<ProposalId> {
        &self.locks
    }
}

pub(crate) fn load_proposal<S: ProposalStore + ?Sized>(
    store: &S,
    id: &ProposalId,
) -> Result<Proposal, GovernanceError> {
    store.get_proposal(id).map_err(|e| match e {
        StoreError::NotFound(_) => GovernanceError::ProposalNotFound(*id),
        other => other.into(),
    })
}
