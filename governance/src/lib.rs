//! Token-weighted DAO governance.
//!
//! Lifecycle: Pending → Active → Passed | Failed
//!
//! - [`ProposalRegistry`] creates and reads proposals.
//! - [`VoteLedger`] records one weighted vote per (proposal, voter).
//! - [`tally`] sums weights per choice; [`resolver`] decides quorum and outcome.
//! - [`LifecycleScheduler`] persists transitions once deadlines pass.
//!
//! Reads resolve lazily: a proposal past its end time reports the outcome the
//! scheduler will persist, computed by the same function, before the scheduler runs.
//! All mutations of one proposal are serialized through a per-proposal lock;
//! different proposals proceed in parallel.

pub mod engine;
pub mod error;
pub mod ledger;
pub mod locks;
pub mod proposals;
pub mod registry;
pub mod resolver;
pub mod scheduler;
pub mod tally;
pub mod view;

pub use engine::GovernanceEngine;
pub use error::GovernanceError;
pub use ledger::VoteLedger;
pub use locks::KeyedLocks;
pub use proposals::{NewProposal, ProposalRegistry};
pub use registry::{DaoRegistry, NewDao, NewMember};
pub use resolver::Resolution;
pub use scheduler::{LifecycleScheduler, StepOutcome, SweepReport};
pub use tally::{percentage, Tally, TallyPercentages};
pub use view::ProposalView;
