//! Quorum and outcome resolution.
//!
//! Everything here is a pure function of the proposal record, its tally and the
//! current time, on integer arithmetic. The read path and the scheduler both call
//! [`effective_status`], so a lazily reported outcome is exactly the one that
//! later gets persisted.

use crate::tally::{percentage, Tally};
use daoship_types::{Proposal, ProposalStatus, Timestamp, Weight};
use serde::Serialize;

/// Whether turnout meets `quorum_percent` of `eligible_weight`.
///
/// Abstentions count toward turnout. With no eligible weight, quorum cannot be met.
pub fn quorum_reached(tally: &Tally, eligible_weight: Weight, quorum_percent: u8) -> bool {
    if eligible_weight == 0 {
        return false;
    }
    // turnout / eligible * 100 >= quorum, cross-multiplied to stay in integers
    tally.total.saturating_mul(100) >= eligible_weight.saturating_mul(Weight::from(quorum_percent))
}

/// Terminal outcome of a finished vote. A yes/no tie fails.
pub fn outcome(tally: &Tally, eligible_weight: Weight, quorum_percent: u8) -> ProposalStatus {
    if quorum_reached(tally, eligible_weight, quorum_percent) && tally.yes > tally.no {
        ProposalStatus::Passed
    } else {
        ProposalStatus::Failed
    }
}

/// Whether the proposal accepts votes at `now`.
///
/// The deadline is authoritative: once `end_time` is reached voting is closed even
/// if the stored status still reads active.
pub fn voting_open(proposal: &Proposal, now: Timestamp) -> bool {
    !proposal.status.is_terminal() && proposal.start_time <= now && now < proposal.end_time
}

/// Whether the proposal has a transition due at `now` that is not yet persisted.
pub fn transition_due(proposal: &Proposal, now: Timestamp) -> bool {
    match proposal.status {
        ProposalStatus::Pending => now >= proposal.start_time,
        ProposalStatus::Active => now >= proposal.end_time,
        ProposalStatus::Passed | ProposalStatus::Failed => false,
    }
}

/// The status a proposal has at `now`, whether or not it has been persisted yet.
pub fn effective_status(proposal: &Proposal, tally: &Tally, now: Timestamp) -> ProposalStatus {
    if proposal.status.is_terminal() {
        return proposal.status;
    }
    if now >= proposal.end_time {
        outcome(tally, proposal.eligible_weight, proposal.quorum_percent)
    } else if now >= proposal.start_time {
        ProposalStatus::Active
    } else {
        ProposalStatus::Pending
    }
}

/// Everything the resolver knows about a proposal at one instant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Resolution {
    pub status: ProposalStatus,
    pub quorum_reached: bool,
    /// Turnout as a share of eligible weight, in percent.
    pub turnout_percent: f64,
    pub voting_open: bool,
}

pub fn resolve(proposal: &Proposal, tally: &Tally, now: Timestamp) -> Resolution {
    Resolution {
        status: effective_status(proposal, tally, now),
        quorum_reached: quorum_reached(tally, proposal.eligible_weight, proposal.quorum_percent),
        turnout_percent: percentage(tally.total, proposal.eligible_weight),
        voting_open: voting_open(proposal, now),
    }
}
