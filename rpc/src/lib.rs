//! HTTP API for the DAOship governance engine.
//!
//! Provides endpoints for:
//! - DAO creation, lookup and membership
//! - Proposal creation, listing and detailed views
//! - Vote casting
//! - Health and Prometheus metrics

pub mod error;
pub mod handlers;
pub mod metrics;
pub mod pagination;
pub mod server;

pub use error::RpcError;
pub use metrics::RpcMetrics;
pub use server::{router, AppState, RpcServer};
