//! Prometheus metrics for the governance API.
//!
//! [`RpcMetrics`] owns a dedicated [`Registry`] that the `/metrics` endpoint
//! encodes into the Prometheus text exposition format. The daemon's sweep loop
//! records finalizations through the same instance.

use daoship_governance::SweepReport;
use prometheus::{
    register_int_counter_vec_with_registry, register_int_counter_with_registry, Encoder,
    IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

pub struct RpcMetrics {
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    pub daos_created: IntCounter,
    pub proposals_created: IntCounter,
    pub votes_cast: IntCounter,
    /// Rejected vote attempts, labelled by error kind.
    pub votes_rejected: IntCounterVec,
    /// Persisted terminal transitions, labelled by outcome.
    pub proposals_finalized: IntCounterVec,
    pub sweep_errors: IntCounter,
}

impl RpcMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let daos_created = register_int_counter_with_registry!(
            Opts::new("daoship_daos_created_total", "Total DAOs created"),
            registry
        )?;
        let proposals_created = register_int_counter_with_registry!(
            Opts::new("daoship_proposals_created_total", "Total proposals created"),
            registry
        )?;
        let votes_cast = register_int_counter_with_registry!(
            Opts::new("daoship_votes_cast_total", "Total votes recorded"),
            registry
        )?;
        let votes_rejected = register_int_counter_vec_with_registry!(
            Opts::new(
                "daoship_votes_rejected_total",
                "Vote attempts rejected, by reason"
            ),
            &["reason"],
            registry
        )?;
        let proposals_finalized = register_int_counter_vec_with_registry!(
            Opts::new(
                "daoship_proposals_finalized_total",
                "Proposals whose outcome was persisted, by outcome"
            ),
            &["outcome"],
            registry
        )?;
        let sweep_errors = register_int_counter_with_registry!(
            Opts::new(
                "daoship_sweep_errors_total",
                "Per-proposal failures during scheduler sweeps"
            ),
            registry
        )?;

        Ok(Self {
            registry,
            daos_created,
            proposals_created,
            votes_cast,
            votes_rejected,
            proposals_finalized,
            sweep_errors,
        })
    }

    pub fn record_sweep(&self, report: &SweepReport) {
        for (_, status) in &report.finalized {
            self.proposals_finalized
                .with_label_values(&[status.as_str()])
                .inc();
        }
        self.sweep_errors.inc_by(report.errors.len() as u64);
    }

    /// Text exposition of every registered metric.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daoship_types::{ProposalId, ProposalStatus};

    #[test]
    fn sweep_report_feeds_outcome_counters() {
        let metrics = RpcMetrics::new().unwrap();
        let report = SweepReport {
            examined: 3,
            activated: vec![],
            finalized: vec![
                (ProposalId::new(1), ProposalStatus::Passed),
                (ProposalId::new(2), ProposalStatus::Failed),
                (ProposalId::new(3), ProposalStatus::Failed),
            ],
            errors: vec![],
        };
        metrics.record_sweep(&report);
        assert_eq!(
            metrics
                .proposals_finalized
                .with_label_values(&["failed"])
                .get(),
            2
        );
        let text = metrics.encode().unwrap();
        assert!(text.contains("daoship_proposals_finalized_total{outcome=\"passed\"} 1"));
    }
}
