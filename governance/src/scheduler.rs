//! Lifecycle scheduler: persists transitions the resolver reports as due.
//!
//! Reads already see lazily resolved statuses, so the scheduler only has to make
//! them durable. Every write is a compare-and-set on the status it read, taken
//! under the proposal's lock; a sweep racing another sweep or a vote cast on the
//! same proposal writes at most once.

use crate::error::GovernanceError;
use crate::proposals::ProposalRegistry;
use crate::resolver;
use crate::tally::Tally;
use daoship_store::GovernanceStore;
use daoship_types::{ProposalId, ProposalStatus, SharedClock};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What a single [`LifecycleScheduler::finalize`] call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Nothing was due, or another writer got there first.
    Unchanged(ProposalStatus),
    /// The persisted status moved from `from` to `to`, possibly through `Active`.
    Advanced {
        from: ProposalStatus,
        to: ProposalStatus,
    },
}

impl StepOutcome {
    pub fn status(&self) -> ProposalStatus {
        match self {
            Self::Unchanged(status) => *status,
            Self::Advanced { to, .. } => *to,
        }
    }
}

/// Result of one pass over the open proposals.
#[derive(Debug, Default)]
pub struct SweepReport {
    pub examined: usize,
    pub activated: Vec<ProposalId>,
    pub finalized: Vec<(ProposalId, ProposalStatus)>,
    pub errors: Vec<(ProposalId, GovernanceError)>,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.activated.is_empty() && self.finalized.is_empty() && self.errors.is_empty()
    }
}

pub struct LifecycleScheduler<S> {
    store: Arc<S>,
    clock: SharedClock,
    proposals: Arc<ProposalRegistry<S>>,
}

impl<S: GovernanceStore> LifecycleScheduler<S> {
    pub fn new(store: Arc<S>, clock: SharedClock, proposals: Arc<ProposalRegistry<S>>) -> Self {
        Self {
            store,
            clock,
            proposals,
        }
    }

    /// Persist every due transition across all open proposals.
    ///
    /// A failure on one proposal is recorded in the report and the sweep moves on.
    pub fn sweep(&self) -> Result<SweepReport, GovernanceError> {
        let now = self.clock.now();
        let open = self.store.list_open_proposals()?;
        let mut report = SweepReport {
            examined: open.len(),
            ..SweepReport::default()
        };

        for proposal in open.iter().filter(|p| resolver::transition_due(p, now)) {
            match self.finalize(&proposal.id) {
                Ok(StepOutcome::Advanced { from, to }) => {
                    if from == ProposalStatus::Pending {
                        report.activated.push(proposal.id);
                    }
                    if to.is_terminal() {
                        report.finalized.push((proposal.id, to));
                    }
                }
                Ok(StepOutcome::Unchanged(_)) => {}
                Err(e) => {
                    warn!(proposal = %proposal.id, error = %e, "sweep failed to advance proposal");
                    report.errors.push((proposal.id, e));
                }
            }
        }

        self.proposals.locks().cleanup();
        if !report.is_empty() {
            info!(
                examined = report.examined,
                activated = report.activated.len(),
                finalized = report.finalized.len(),
                errors = report.errors.len(),
                "sweep complete"
            );
        }
        Ok(report)
    }

    /// Persist whatever transitions are due for one proposal right now.
    ///
    /// A terminal proposal is left alone. A pending proposal whose whole window has
    /// elapsed is activated and then finalized in the same call.
    pub fn finalize(&self, id: &ProposalId) -> Result<StepOutcome, GovernanceError> {
        self.proposals.locks().with_lock(id, || {
            let initial = self.proposals.load_stored(id)?.status;
            let mut current;
            loop {
                let proposal = self.proposals.load_stored(id)?;
                current = proposal.status;
                let now = self.clock.now();
                if !resolver::transition_due(&proposal, now) {
                    break;
                }
                let next = match proposal.status {
                    ProposalStatus::Pending => ProposalStatus::Active,
                    _ => {
                        let tally = Tally::from_votes(&self.store.get_votes(id)?);
                        resolver::effective_status(&proposal, &tally, now)
                    }
                };
                if !self.proposals.transition_status(id, next)? {
                    debug!(proposal = %id, "status changed underneath, skipping");
                    current = self.proposals.load_stored(id)?.status;
                    break;
                }
            }

            if current == initial {
                Ok(StepOutcome::Unchanged(current))
            } else {
                Ok(StepOutcome::Advanced {
                    from: initial,
                    to: current,
                })
            }
        })
    }
}
