//! Votes and vote choices.

use crate::{ProposalId, Timestamp, TypesError, WalletAddress, Weight};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a voter voted. Abstentions count toward turnout only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    Yes,
    No,
    Abstain,
}

impl VoteChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::Abstain => "abstain",
        }
    }
}

impl fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteChoice {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" => Ok(Self::Yes),
            "no" => Ok(Self::No),
            "abstain" => Ok(Self::Abstain),
            _ => Err(TypesError::UnknownChoice(s.to_string())),
        }
    }
}

/// A cast vote. Weight is the voter's eligible balance at cast time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub proposal_id: ProposalId,
    pub voter: WalletAddress,
    pub choice: VoteChoice,
    pub cast_at: Timestamp,
    pub weight: Weight,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_choices() {
        assert_eq!("YES".parse::<VoteChoice>().unwrap(), VoteChoice::Yes);
        assert_eq!(" abstain ".parse::<VoteChoice>().unwrap(), VoteChoice::Abstain);
    }

    #[test]
    fn rejects_unknown_choice() {
        assert_eq!(
            "maybe".parse::<VoteChoice>(),
            Err(TypesError::UnknownChoice("maybe".into()))
        );
    }
}
