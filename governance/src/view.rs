//! Read model combining a proposal with its derived tally and status.

use crate::resolver::{self, Resolution};
use crate::tally::{Tally, TallyPercentages};
use daoship_types::{Proposal, Timestamp, Vote};
use daoship_utils::{format_duration, Countdown};
use serde::Serialize;

/// A proposal as callers see it at one instant.
///
/// `proposal.status` is the effective status, so a proposal past its deadline
/// reads as passed or failed even before the scheduler has persisted that.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProposalView {
    pub proposal: Proposal,
    pub tally: Tally,
    pub percentages: TallyPercentages,
    pub quorum_reached: bool,
    pub turnout_percent: f64,
    pub voting_open: bool,
    pub vote_count: usize,
    /// Time left until the end of voting, zero once it has closed.
    pub time_remaining: Countdown,
    pub time_remaining_secs: u64,
}

impl ProposalView {
    /// Derive the view from a stored proposal and its full vote ledger.
    pub fn new(mut proposal: Proposal, votes: &[Vote], now: Timestamp) -> Self {
        let tally = Tally::from_votes(votes);
        let Resolution {
            status,
            quorum_reached,
            turnout_percent,
            voting_open,
        } = resolver::resolve(&proposal, &tally, now);
        proposal.status = status;

        let time_remaining_secs = if status.is_terminal() {
            0
        } else {
            proposal.end_time.remaining_from(now)
        };
        Self {
            percentages: tally.percentages(),
            tally,
            quorum_reached,
            turnout_percent,
            voting_open,
            vote_count: votes.len(),
            time_remaining: Countdown::from_secs(time_remaining_secs),
            time_remaining_secs,
            proposal,
        }
    }

    /// Short human summary, used in logs.
    pub fn summary(&self) -> String {
        format!(
            "{} [{}] yes {:.1}% no {:.1}% abstain {:.1}%, {} left",
            self.proposal.id,
            self.proposal.status,
            self.percentages.yes,
            self.percentages.no,
            self.percentages.abstain,
            format_duration(self.time_remaining_secs),
        )
    }
}
