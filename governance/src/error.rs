use daoship_store::StoreError;
use daoship_types::{DaoId, ProposalId, ProposalStatus, WalletAddress, Weight};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("proposal {0} not found")]
    ProposalNotFound(ProposalId),

    #[error("DAO {0} not found")]
    DaoNotFound(DaoId),

    #[error("insufficient voting weight: have {have}, need {need}")]
    NotEligible { have: Weight, need: Weight },

    #[error("proposal {0} is not open for voting")]
    ProposalNotActive(ProposalId),

    #[error("wallet {voter} has already voted on {proposal}")]
    DuplicateVote {
        proposal: ProposalId,
        voter: WalletAddress,
    },

    #[error("voting period of {days} days is outside 1..={max}")]
    InvalidPeriod { days: u32, max: u32 },

    #[error("cannot move proposal from {from} to {to}")]
    InvalidTransition {
        from: ProposalStatus,
        to: ProposalStatus,
    },

    #[error("unknown vote choice: {0}")]
    UnknownChoice(String),

    #[error("invalid proposal: {0}")]
    InvalidProposal(String),

    #[error("invalid DAO configuration: {0}")]
    InvalidConfig(String),

    #[error("wallet {0} is already a member")]
    AlreadyMember(WalletAddress),

    #[error("wallet {0} is not a member")]
    NotMember(WalletAddress),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl GovernanceError {
    /// Stable machine-readable name, used in API error bodies and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ProposalNotFound(_) | Self::DaoNotFound(_) => "not_found",
            Self::NotEligible { .. } => "not_eligible",
            Self::ProposalNotActive(_) => "proposal_not_active",
            Self::DuplicateVote { .. } => "duplicate_vote",
            Self::InvalidPeriod { .. } => "invalid_period",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::UnknownChoice(_) => "unknown_choice",
            Self::InvalidProposal(_) => "invalid_proposal",
            Self::InvalidConfig(_) => "invalid_config",
            Self::AlreadyMember(_) => "already_member",
            Self::NotMember(_) => "not_member",
            Self::Store(_) => "storage",
        }
    }
}
