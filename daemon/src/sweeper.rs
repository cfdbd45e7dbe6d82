//! Periodic lifecycle sweep.

use daoship_governance::{GovernanceEngine, SweepReport};
use daoship_rpc::RpcMetrics;
use daoship_store::GovernanceStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Sweep every `interval` until shutdown. Sweeps never overlap: a slow sweep
/// delays the next tick instead of queueing another.
pub async fn run<S: GovernanceStore + 'static>(
    engine: Arc<GovernanceEngine<S>>,
    metrics: Arc<RpcMetrics>,
    interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(interval_secs = interval.as_secs(), "lifecycle sweeper started");

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                info!("lifecycle sweeper stopping");
                break;
            }
            _ = ticker.tick() => {
                sweep_once(&engine, &metrics).await;
            }
        }
    }
}

/// Run one sweep on the blocking pool and record its outcome.
pub async fn sweep_once<S: GovernanceStore + 'static>(
    engine: &Arc<GovernanceEngine<S>>,
    metrics: &RpcMetrics,
) -> Option<SweepReport> {
    let engine = Arc::clone(engine);
    match tokio::task::spawn_blocking(move || engine.sweep()).await {
        Ok(Ok(report)) => {
            metrics.record_sweep(&report);
            for (id, e) in &report.errors {
                warn!(proposal = %id, error = %e, "proposal left for next sweep");
            }
            debug!(examined = report.examined, "sweep tick");
            Some(report)
        }
        Ok(Err(e)) => {
            error!(error = %e, "sweep failed");
            None
        }
        Err(e) => {
            error!(error = %e, "sweep task panicked");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daoship_governance::{NewDao, NewMember, NewProposal};
    use daoship_nullables::{NullClock, NullGovernanceStore};
    use daoship_types::{
        GovernanceConfig, ProposalStatus, TokenInfo, VoteChoice, WalletAddress, SECS_PER_DAY,
    };

    fn addr(s: &str) -> WalletAddress {
        WalletAddress::parse(s).unwrap()
    }

    #[tokio::test]
    async fn sweep_once_persists_and_counts_outcomes() {
        let clock = Arc::new(NullClock::new(0));
        let store = Arc::new(NullGovernanceStore::new());
        let engine = Arc::new(GovernanceEngine::new(Arc::clone(&store), clock.clone()));
        let metrics = RpcMetrics::new().unwrap();

        let dao = engine
            .create_dao(NewDao {
                name: "Sweep DAO".into(),
                description: String::new(),
                token: TokenInfo {
                    name: "Sweep".into(),
                    symbol: "SWP".into(),
                    supply: 100,
                },
                config: GovernanceConfig::default(),
                founder: NewMember {
                    address: addr("founder"),
                    display_name: None,
                    weight: 100,
                },
            })
            .unwrap();
        let proposal = engine
            .create_proposal(NewProposal {
                dao_id: dao.id,
                creator: addr("founder"),
                title: "Ship it".into(),
                description: String::new(),
                voting_period_days: Some(1),
            })
            .unwrap();
        engine
            .cast_vote(&proposal.id, &addr("founder"), VoteChoice::Yes)
            .unwrap();
        clock.advance(SECS_PER_DAY);

        let report = sweep_once(&engine, &metrics).await.unwrap();
        assert_eq!(report.finalized, vec![(proposal.id, ProposalStatus::Passed)]);
        assert_eq!(
            metrics
                .proposals_finalized
                .with_label_values(&["passed"])
                .get(),
            1
        );
    }

    #[tokio::test]
    async fn store_failure_is_logged_not_fatal() {
        let store = Arc::new(NullGovernanceStore::new());
        let engine = Arc::new(GovernanceEngine::new(
            Arc::clone(&store),
            Arc::new(NullClock::new(0)),
        ));
        let metrics = RpcMetrics::new().unwrap();
        store.fail_next(1);
        assert!(sweep_once(&engine, &metrics).await.is_none());
        assert!(sweep_once(&engine, &metrics).await.is_some());
    }

    #[tokio::test]
    async fn run_stops_on_shutdown() {
        let engine = Arc::new(GovernanceEngine::new(
            Arc::new(NullGovernanceStore::new()),
            Arc::new(NullClock::new(0)),
        ));
        let metrics = Arc::new(RpcMetrics::new().unwrap());
        let (tx, rx) = broadcast::channel(1);
        let handle = tokio::spawn(run(engine, metrics, Duration::from_millis(10), rx));
        tx.send(()).unwrap();
        handle.await.unwrap();
    }
}
