//! Weighted vote tallies.
//!
//! Buckets hold summed voting weight, not head counts. Tallies are recomputed from
//! the ledger on every read; nothing here is cached.

use daoship_types::{Vote, VoteChoice, Weight};
use serde::Serialize;

/// Summed weight per choice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub yes: Weight,
    pub no: Weight,
    pub abstain: Weight,
    /// Turnout: `yes + no + abstain`.
    pub total: Weight,
}

impl Tally {
    pub fn from_votes<'a>(votes: impl IntoIterator<Item = &'a Vote>) -> Self {
        let mut tally = Self::default();
        for vote in votes {
            tally.add(vote.choice, vote.weight);
        }
        tally
    }

    pub fn add(&mut self, choice: VoteChoice, weight: Weight) {
        let bucket = match choice {
            VoteChoice::Yes => &mut self.yes,
            VoteChoice::No => &mut self.no,
            VoteChoice::Abstain => &mut self.abstain,
        };
        *bucket = bucket.saturating_add(weight);
        self.total = self.total.saturating_add(weight);
    }

    /// Weight of `choice`.
    pub fn weight_of(&self, choice: VoteChoice) -> Weight {
        match choice {
            VoteChoice::Yes => self.yes,
            VoteChoice::No => self.no,
            VoteChoice::Abstain => self.abstain,
        }
    }

    pub fn percentages(&self) -> TallyPercentages {
        TallyPercentages {
            yes: percentage(self.yes, self.total),
            no: percentage(self.no, self.total),
            abstain: percentage(self.abstain, self.total),
        }
    }
}

/// Share of turnout per choice, in percent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct TallyPercentages {
    pub yes: f64,
    pub no: f64,
    pub abstain: f64,
}

/// Tally a ledger snapshot.
pub fn tally(votes: &[Vote]) -> Tally {
    Tally::from_votes(votes)
}

/// `bucket` as a percentage of `total`; zero when nothing has been cast.
pub fn percentage(bucket: Weight, total: Weight) -> f64 {
    if total == 0 {
        return 0.0;
    }
    bucket as f64 / total as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use daoship_types::{ProposalId, Timestamp, WalletAddress};
    use proptest::prelude::*;

    fn vote(n: usize, choice: VoteChoice, weight: Weight) -> Vote {
        Vote {
            proposal_id: ProposalId::new(1),
            voter: WalletAddress::parse(format!("voter{n}")).unwrap(),
            choice,
            cast_at: Timestamp::EPOCH,
            weight,
        }
    }

    fn choice_strategy() -> impl Strategy<Value = VoteChoice> {
        prop_oneof![
            Just(VoteChoice::Yes),
            Just(VoteChoice::No),
            Just(VoteChoice::Abstain)
        ]
    }

    #[test]
    fn sums_weights_not_heads() {
        let votes = vec![
            vote(1, VoteChoice::Yes, 30),
            vote(2, VoteChoice::No, 10),
            vote(3, VoteChoice::Abstain, 10),
            vote(4, VoteChoice::Yes, 5),
        ];
        let t = tally(&votes);
        assert_eq!((t.yes, t.no, t.abstain, t.total), (35, 10, 10, 55));
    }

    #[test]
    fn empty_ledger_has_zero_percentages() {
        let p = tally(&[]).percentages();
        assert_eq!(p, TallyPercentages::default());
    }

    #[test]
    fn percentage_of_total() {
        assert_eq!(percentage(30, 50), 60.0);
        assert_eq!(percentage(0, 50), 0.0);
    }

    proptest! {
        #[test]
        fn buckets_sum_to_total(
            entries in prop::collection::vec((choice_strategy(), 0u128..1_000_000), 0..64)
        ) {
            let votes: Vec<_> = entries
                .iter()
                .enumerate()
                .map(|(i, (c, w))| vote(i, *c, *w))
                .collect();
            let t = tally(&votes);
            prop_assert_eq!(t.yes + t.no + t.abstain, t.total);
        }

        #[test]
        fn percentage_of_zero_total_is_zero(bucket in 0u128..u128::MAX) {
            prop_assert_eq!(percentage(bucket, 0), 0.0);
        }

        #[test]
        fn order_of_votes_is_irrelevant(
            entries in prop::collection::vec((choice_strategy(), 0u128..1_000), 0..32)
        ) {
            let mut votes: Vec<_> = entries
                .iter()
                .enumerate()
                .map(|(i, (c, w))| vote(i, *c, *w))
                .collect();
            let forward = tally(&votes);
            votes.reverse();
            prop_assert_eq!(tally(&votes), forward);
        }
    }
}
