//! RPC error types and their HTTP rendering.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use daoship_governance::GovernanceError;
use daoship_store::StoreError;
use daoship_types::TypesError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error(transparent)]
    Governance(#[from] GovernanceError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl RpcError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Governance(e) => match e {
                GovernanceError::ProposalNotFound(_) | GovernanceError::DaoNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                GovernanceError::NotEligible { .. } => StatusCode::FORBIDDEN,
                GovernanceError::ProposalNotActive(_)
                | GovernanceError::DuplicateVote { .. }
                | GovernanceError::InvalidTransition { .. }
                | GovernanceError::AlreadyMember(_)
                | GovernanceError::NotMember(_) => StatusCode::CONFLICT,
                GovernanceError::InvalidPeriod { .. }
                | GovernanceError::InvalidProposal(_)
                | GovernanceError::InvalidConfig(_)
                | GovernanceError::UnknownChoice(_) => StatusCode::BAD_REQUEST,
                GovernanceError::Store(StoreError::Transient(_)) => StatusCode::SERVICE_UNAVAILABLE,
                GovernanceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Governance(e) => e.kind(),
            Self::InvalidRequest(_) => "invalid_request",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<TypesError> for RpcError {
    fn from(e: TypesError) -> Self {
        match e {
            TypesError::UnknownChoice(choice) => GovernanceError::UnknownChoice(choice).into(),
            other => Self::InvalidRequest(other.to_string()),
        }
    }
}

impl From<JsonRejection> for RpcError {
    fn from(e: JsonRejection) -> Self {
        Self::InvalidRequest(e.body_text())
    }
}

impl From<QueryRejection> for RpcError {
    fn from(e: QueryRejection) -> Self {
        Self::InvalidRequest(e.body_text())
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
