//! DAOs, their governance configuration and membership.

use crate::{DaoId, Timestamp, WalletAddress, SECS_PER_DAY, SECS_PER_HOUR};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Token-derived voting influence.
pub type Weight = u128;

/// Upper bound on a DAO's voting period.
pub const MAX_VOTING_PERIOD_DAYS: u32 = 30;

/// The governance token a DAO votes with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub supply: u128,
}

/// Governance parameters of a DAO.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// Default and maximum voting period of a proposal, in days. In `1..=30`.
    pub voting_period_days: u32,
    /// Share of eligible weight that must turn out, in percent. In `1..=100`.
    pub quorum_percent: u8,
    /// Minimum weight needed to vote or propose.
    pub min_tokens_to_participate: Weight,
    /// Delay between proposal creation and the start of voting, in hours.
    #[serde(default)]
    pub voting_delay_hours: u32,
}

impl GovernanceConfig {
    /// Check the config invariants, returning a description of the first violation.
    pub fn validate(&self) -> Result<(), String> {
        if self.voting_period_days < 1 {
            return Err("voting period must be at least one day".into());
        }
        if self.voting_period_days > MAX_VOTING_PERIOD_DAYS {
            return Err(format!(
                "voting period must be at most {MAX_VOTING_PERIOD_DAYS} days, got {}",
                self.voting_period_days
            ));
        }
        if self.quorum_percent == 0 || self.quorum_percent > 100 {
            return Err(format!(
                "quorum must be in 1..=100 percent, got {}",
                self.quorum_percent
            ));
        }
        Ok(())
    }

    /// Longest voting period a proposal in this DAO may request.
    pub fn max_voting_period_days(&self) -> u32 {
        self.voting_period_days
    }

    pub fn voting_delay_secs(&self) -> u64 {
        u64::from(self.voting_delay_hours) * SECS_PER_HOUR
    }

    pub fn period_secs(days: u32) -> u64 {
        u64::from(days) * SECS_PER_DAY
    }
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            voting_period_days: 7,
            quorum_percent: 50,
            min_tokens_to_participate: 100,
            voting_delay_hours: 0,
        }
    }
}

/// A member of a DAO.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub address: WalletAddress,
    pub display_name: Option<String>,
    pub weight: Weight,
    pub joined_at: Timestamp,
}

/// A decentralized autonomous organization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dao {
    pub id: DaoId,
    pub name: String,
    pub description: String,
    pub token: TokenInfo,
    pub config: GovernanceConfig,
    pub members: BTreeMap<WalletAddress, Member>,
    pub created_at: Timestamp,
}

impl Dao {
    pub fn member(&self, address: &WalletAddress) -> Option<&Member> {
        self.members.get(address)
    }

    /// Registered weight of `address`, zero for non-members.
    pub fn weight_of(&self, address: &WalletAddress) -> Weight {
        self.members.get(address).map(|m| m.weight).unwrap_or(0)
    }

    pub fn is_eligible(&self, weight: Weight) -> bool {
        weight >= self.config.min_tokens_to_participate
    }

    /// Sum of weights of members currently eligible to vote.
    pub fn total_eligible_weight(&self) -> Weight {
        self.members
            .values()
            .filter(|m| self.is_eligible(m.weight))
            .fold(0u128, |acc, m| acc.saturating_add(m.weight))
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(addr: &str, weight: Weight) -> Member {
        Member {
            address: WalletAddress::parse(addr).unwrap(),
            display_name: None,
            weight,
            joined_at: Timestamp::EPOCH,
        }
    }

    #[test]
    fn eligible_weight_skips_small_holders() {
        let mut members = BTreeMap::new();
        for m in [member("a", 150), member("b", 99), member("c", 100)] {
            members.insert(m.address.clone(), m);
        }
        let dao = Dao {
            id: DaoId::new(1),
            name: "AlgoVentures".into(),
            description: String::new(),
            token: TokenInfo {
                name: "AlgoVentures".into(),
                symbol: "ALVEN".into(),
                supply: 1_000_000,
            },
            config: GovernanceConfig::default(),
            members,
            created_at: Timestamp::EPOCH,
        };
        assert_eq!(dao.total_eligible_weight(), 250);
        assert_eq!(dao.weight_of(&WalletAddress::parse("zz").unwrap()), 0);
    }

    #[test]
    fn config_bounds() {
        let mut config = GovernanceConfig::default();
        assert!(config.validate().is_ok());
        config.quorum_percent = 0;
        assert!(config.validate().is_err());
        config.quorum_percent = 101;
        assert!(config.validate().is_err());
        config.quorum_percent = 100;
        config.voting_period_days = 0;
        assert!(config.validate().is_err());
        config.voting_period_days = MAX_VOTING_PERIOD_DAYS;
        assert!(config.validate().is_ok());
        config.voting_period_days = MAX_VOTING_PERIOD_DAYS + 1;
        assert!(config.validate().is_err());
    }
}
