//! Governance proposals and their lifecycle status.

use crate::{DaoId, ProposalId, Timestamp, TypesError, WalletAddress, Weight};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a proposal.
///
/// ```text
/// Pending ──> Active ──> Passed
///                   └──> Failed
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    /// Created, voting has not opened yet.
    Pending,
    /// Accepting votes until the end time.
    Active,
    /// Quorum met and yes outweighed no.
    Passed,
    /// Quorum missed, or yes did not outweigh no.
    Failed,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Passed => "passed",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Passed | Self::Failed)
    }

    /// Whether the state machine has an edge from `self` to `next`.
    pub fn can_transition_to(&self, next: ProposalStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Active) | (Self::Active, Self::Passed) | (Self::Active, Self::Failed)
        )
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProposalStatus {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "passed" => Ok(Self::Passed),
            "failed" => Ok(Self::Failed),
            _ => Err(TypesError::UnknownStatus(s.to_string())),
        }
    }
}

/// A time-boxed governance item members vote on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub dao_id: DaoId,
    pub title: String,
    pub description: String,
    pub creator: WalletAddress,
    pub created_at: Timestamp,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    /// Persisted status. Reads derive the effective status from this plus the clock.
    pub status: ProposalStatus,
    /// Quorum of the owning DAO when the proposal was created.
    pub quorum_percent: u8,
    /// Eligible weight of the owning DAO when the proposal was created.
    pub eligible_weight: Weight,
}

impl Proposal {
    pub fn voting_period_secs(&self) -> u64 {
        self.end_time.as_secs().saturating_sub(self.start_time.as_secs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_have_no_exits() {
        for from in [ProposalStatus::Passed, ProposalStatus::Failed] {
            for to in [
                ProposalStatus::Pending,
                ProposalStatus::Active,
                ProposalStatus::Passed,
                ProposalStatus::Failed,
            ] {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn no_skipping_activation() {
        assert!(!ProposalStatus::Pending.can_transition_to(ProposalStatus::Passed));
        assert!(ProposalStatus::Pending.can_transition_to(ProposalStatus::Active));
        assert!(!ProposalStatus::Active.can_transition_to(ProposalStatus::Pending));
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("Active".parse::<ProposalStatus>().unwrap(), ProposalStatus::Active);
        assert!("completed".parse::<ProposalStatus>().is_err());
    }
}
