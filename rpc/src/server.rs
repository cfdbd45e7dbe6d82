//! Axum-based HTTP server.

use crate::handlers;
use crate::metrics::RpcMetrics;
use axum::routing::{get, post};
use axum::Router;
use daoship_governance::GovernanceEngine;
use daoship_store::GovernanceStore;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Shared state handed to every handler.
pub struct AppState<S> {
    pub engine: Arc<GovernanceEngine<S>>,
    pub metrics: Arc<RpcMetrics>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

/// Build the router with every endpoint mounted.
pub fn router<S: GovernanceStore + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics::<S>))
        .route(
            "/dao",
            get(handlers::list_daos::<S>).post(handlers::create_dao::<S>),
        )
        .route("/dao/:dao_id", get(handlers::get_dao::<S>))
        .route("/dao/:dao_id/join", post(handlers::join_dao::<S>))
        .route("/dao/:dao_id/leave", post(handlers::leave_dao::<S>))
        .route(
            "/dao/:dao_id/proposals",
            get(handlers::list_proposals::<S>).post(handlers::create_proposal::<S>),
        )
        .route(
            "/dao/:dao_id/proposals/:proposal_id/vote",
            post(handlers::cast_vote::<S>),
        )
        .route("/proposal/dao/:dao_id", get(handlers::list_proposals::<S>))
        .route("/proposal/:proposal_id", get(handlers::get_proposal::<S>))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub struct RpcServer<S> {
    pub addr: SocketAddr,
    pub state: AppState<S>,
}

impl<S: GovernanceStore + 'static> RpcServer<S> {
    pub fn new(addr: SocketAddr, state: AppState<S>) -> Self {
        Self { addr, state }
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn start(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> std::io::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        info!(addr = %listener.local_addr()?, "HTTP API listening");
        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(shutdown)
            .await
    }
}
