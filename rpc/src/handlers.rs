//! HTTP request handlers and their JSON shapes.
//!
//! Field names are camelCase to match the browser client. Identifiers travel
//! as strings (`dao-3`, `prop-12`); weights and timestamps as integers.

use crate::error::RpcError;
use crate::pagination::{PaginationMeta, PaginationParams};
use crate::server::AppState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use daoship_governance::{
    GovernanceEngine, GovernanceError, NewDao, NewMember, NewProposal, ProposalView, Tally,
    TallyPercentages,
};
use daoship_store::GovernanceStore;
use daoship_types::{
    Dao, DaoId, GovernanceConfig, Member, Proposal, ProposalId, ProposalStatus, TokenInfo,
    Vote, VoteChoice, WalletAddress, Weight,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Run an engine call off the async runtime; every engine call may block on
/// storage or a proposal lock.
async fn blocking<S, T, F>(state: &AppState<S>, f: F) -> Result<T, RpcError>
where
    S: GovernanceStore + 'static,
    T: Send + 'static,
    F: FnOnce(&GovernanceEngine<S>) -> Result<T, GovernanceError> + Send + 'static,
{
    let engine = Arc::clone(&state.engine);
    tokio::task::spawn_blocking(move || f(&engine))
        .await
        .map_err(|e| RpcError::Internal(format!("engine task failed: {e}")))?
        .map_err(RpcError::from)
}

// ── DAO ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDaoRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Founder wallet; becomes the first member.
    pub creator: String,
    #[serde(default)]
    pub creator_name: Option<String>,
    pub creator_weight: Weight,
    #[serde(default)]
    pub token_name: Option<String>,
    pub token_symbol: String,
    #[serde(default)]
    pub token_supply: Weight,
    #[serde(alias = "votingPeriodDays")]
    pub voting_period: Option<u32>,
    #[serde(alias = "quorumPercent")]
    pub quorum: Option<u8>,
    #[serde(alias = "minTokensToParticipate")]
    pub min_tokens: Option<Weight>,
    #[serde(default)]
    pub voting_delay_hours: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    pub address: String,
    pub display_name: Option<String>,
    pub weight: Weight,
    pub joined_at: u64,
}

impl From<&Member> for MemberResponse {
    fn from(m: &Member) -> Self {
        Self {
            address: m.address.to_string(),
            display_name: m.display_name.clone(),
            weight: m.weight,
            joined_at: m.joined_at.as_secs(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaoResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub token_name: String,
    pub token_symbol: String,
    pub token_supply: Weight,
    pub voting_period_days: u32,
    pub quorum_percent: u8,
    pub min_tokens_to_participate: Weight,
    pub voting_delay_hours: u32,
    pub member_count: usize,
    pub total_eligible_weight: Weight,
    pub members: Vec<MemberResponse>,
    pub created_at: u64,
}

impl From<&Dao> for DaoResponse {
    fn from(dao: &Dao) -> Self {
        Self {
            id: dao.id.to_string(),
            name: dao.name.clone(),
            description: dao.description.clone(),
            token_name: dao.token.name.clone(),
            token_symbol: dao.token.symbol.clone(),
            token_supply: dao.token.supply,
            voting_period_days: dao.config.voting_period_days,
            quorum_percent: dao.config.quorum_percent,
            min_tokens_to_participate: dao.config.min_tokens_to_participate,
            voting_delay_hours: dao.config.voting_delay_hours,
            member_count: dao.member_count(),
            total_eligible_weight: dao.total_eligible_weight(),
            members: dao.members.values().map(MemberResponse::from).collect(),
            created_at: dao.created_at.as_secs(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub address: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub weight: Weight,
}

#[derive(Debug, Deserialize)]
pub struct LeaveRequest {
    pub address: String,
}

pub async fn create_dao<S: GovernanceStore + 'static>(
    State(state): State<AppState<S>>,
    payload: Result<Json<CreateDaoRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DaoResponse>), RpcError> {
    let Json(req) = payload?;
    let defaults = GovernanceConfig::default();
    let new = NewDao {
        token: TokenInfo {
            name: req.token_name.unwrap_or_else(|| req.name.clone()),
            symbol: req.token_symbol,
            supply: req.token_supply,
        },
        config: GovernanceConfig {
            voting_period_days: req.voting_period.unwrap_or(defaults.voting_period_days),
            quorum_percent: req.quorum.unwrap_or(defaults.quorum_percent),
            min_tokens_to_participate: req
                .min_tokens
                .unwrap_or(defaults.min_tokens_to_participate),
            voting_delay_hours: req.voting_delay_hours,
        },
        founder: NewMember {
            address: WalletAddress::parse(&req.creator)?,
            display_name: req.creator_name,
            weight: req.creator_weight,
        },
        name: req.name,
        description: req.description,
    };
    let dao = blocking(&state, move |engine| engine.create_dao(new)).await?;
    state.metrics.daos_created.inc();
    Ok((StatusCode::CREATED, Json(DaoResponse::from(&dao))))
}

pub async fn list_daos<S: GovernanceStore + 'static>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<DaoResponse>>, RpcError> {
    let daos = blocking(&state, |engine| engine.list_daos()).await?;
    Ok(Json(daos.iter().map(DaoResponse::from).collect()))
}

pub async fn get_dao<S: GovernanceStore + 'static>(
    State(state): State<AppState<S>>,
    Path(dao_id): Path<String>,
) -> Result<Json<DaoResponse>, RpcError> {
    let id: DaoId = dao_id.parse()?;
    let dao = blocking(&state, move |engine| engine.get_dao(&id)).await?;
    Ok(Json(DaoResponse::from(&dao)))
}

pub async fn join_dao<S: GovernanceStore + 'static>(
    State(state): State<AppState<S>>,
    Path(dao_id): Path<String>,
    payload: Result<Json<JoinRequest>, JsonRejection>,
) -> Result<Json<DaoResponse>, RpcError> {
    let id: DaoId = dao_id.parse()?;
    let Json(req) = payload?;
    let member = NewMember {
        address: WalletAddress::parse(&req.address)?,
        display_name: req.display_name,
        weight: req.weight,
    };
    let dao = blocking(&state, move |engine| engine.join_dao(&id, member)).await?;
    Ok(Json(DaoResponse::from(&dao)))
}

pub async fn leave_dao<S: GovernanceStore + 'static>(
    State(state): State<AppState<S>>,
    Path(dao_id): Path<String>,
    payload: Result<Json<LeaveRequest>, JsonRejection>,
) -> Result<Json<DaoResponse>, RpcError> {
    let id: DaoId = dao_id.parse()?;
    let Json(req) = payload?;
    let address = WalletAddress::parse(&req.address)?;
    let dao = blocking(&state, move |engine| engine.leave_dao(&id, &address)).await?;
    Ok(Json(DaoResponse::from(&dao)))
}

// ── Proposal ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProposalRequest {
    pub creator: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "votingPeriodDays")]
    pub voting_period: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalResponse {
    pub id: String,
    pub dao_id: String,
    pub title: String,
    pub description: String,
    pub creator: String,
    pub status: ProposalStatus,
    pub created_at: u64,
    pub start_time: u64,
    pub end_time: u64,
    pub quorum_percent: u8,
    pub eligible_weight: Weight,
}

impl From<&Proposal> for ProposalResponse {
    fn from(p: &Proposal) -> Self {
        Self {
            id: p.id.to_string(),
            dao_id: p.dao_id.to_string(),
            title: p.title.clone(),
            description: p.description.clone(),
            creator: p.creator.to_string(),
            status: p.status,
            created_at: p.created_at.as_secs(),
            start_time: p.start_time.as_secs(),
            end_time: p.end_time.as_secs(),
            quorum_percent: p.quorum_percent,
            eligible_weight: p.eligible_weight,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRemaining {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalViewResponse {
    #[serde(flatten)]
    pub proposal: ProposalResponse,
    pub tally: Tally,
    pub percentages: TallyPercentages,
    pub quorum_reached: bool,
    pub turnout_percent: f64,
    pub voting_open: bool,
    pub vote_count: usize,
    pub time_remaining: TimeRemaining,
    /// Present when the request named a `voter`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_voted: Option<bool>,
}

impl ProposalViewResponse {
    fn new(view: &ProposalView, has_voted: Option<bool>) -> Self {
        Self {
            proposal: ProposalResponse::from(&view.proposal),
            tally: view.tally,
            percentages: view.percentages,
            quorum_reached: view.quorum_reached,
            turnout_percent: view.turnout_percent,
            voting_open: view.voting_open,
            vote_count: view.vote_count,
            time_remaining: TimeRemaining {
                days: view.time_remaining.days,
                hours: view.time_remaining.hours,
                minutes: view.time_remaining.minutes,
                seconds: view.time_remaining_secs,
            },
            has_voted,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListProposalsQuery {
    pub status: Option<String>,
    pub cursor: Option<String>,
    pub count: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ListProposalsResponse {
    pub proposals: Vec<ProposalResponse>,
    #[serde(flatten)]
    pub pagination: PaginationMeta,
}

#[derive(Debug, Deserialize)]
pub struct ProposalQuery {
    pub voter: Option<String>,
}

pub async fn create_proposal<S: GovernanceStore + 'static>(
    State(state): State<AppState<S>>,
    Path(dao_id): Path<String>,
    payload: Result<Json<CreateProposalRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ProposalResponse>), RpcError> {
    let dao_id: DaoId = dao_id.parse()?;
    let Json(req) = payload?;
    let new = NewProposal {
        dao_id,
        creator: WalletAddress::parse(&req.creator)?,
        title: req.title,
        description: req.description,
        voting_period_days: req.voting_period,
    };
    let proposal = blocking(&state, move |engine| engine.create_proposal(new)).await?;
    state.metrics.proposals_created.inc();
    Ok((StatusCode::CREATED, Json(ProposalResponse::from(&proposal))))
}

pub async fn list_proposals<S: GovernanceStore + 'static>(
    State(state): State<AppState<S>>,
    Path(dao_id): Path<String>,
    query: Result<Query<ListProposalsQuery>, QueryRejection>,
) -> Result<Json<ListProposalsResponse>, RpcError> {
    let dao_id: DaoId = dao_id.parse()?;
    let Query(query) = query?;
    let status = query
        .status
        .as_deref()
        .map(str::parse::<ProposalStatus>)
        .transpose()?;
    let proposals = blocking(&state, move |engine| engine.list_proposals(&dao_id, status)).await?;

    let params = PaginationParams {
        cursor: query.cursor,
        count: query.count,
    };
    let (page, pagination) = params.page(proposals);
    debug!(dao = %dao_id, returned = page.len(), "listed proposals");
    Ok(Json(ListProposalsResponse {
        proposals: page.iter().map(ProposalResponse::from).collect(),
        pagination,
    }))
}

pub async fn get_proposal<S: GovernanceStore + 'static>(
    State(state): State<AppState<S>>,
    Path(proposal_id): Path<String>,
    query: Result<Query<ProposalQuery>, QueryRejection>,
) -> Result<Json<ProposalViewResponse>, RpcError> {
    let id: ProposalId = proposal_id.parse()?;
    let Query(query) = query?;
    let voter = query
        .voter
        .as_deref()
        .map(WalletAddress::parse)
        .transpose()?;
    let (view, has_voted) = blocking(&state, move |engine| {
        let view = engine.view_proposal(&id)?;
        let has_voted = voter
            .map(|voter| engine.has_voted(&id, &voter))
            .transpose()?;
        Ok((view, has_voted))
    })
    .await?;
    Ok(Json(ProposalViewResponse::new(&view, has_voted)))
}

// ── Vote ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CastVoteRequest {
    pub voter: String,
    pub vote: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    pub proposal_id: String,
    pub voter: String,
    pub choice: VoteChoice,
    pub weight: Weight,
    pub cast_at: u64,
}

impl From<&Vote> for VoteResponse {
    fn from(v: &Vote) -> Self {
        Self {
            proposal_id: v.proposal_id.to_string(),
            voter: v.voter.to_string(),
            choice: v.choice,
            weight: v.weight,
            cast_at: v.cast_at.as_secs(),
        }
    }
}

/// The recorded vote, plus the refreshed proposal view when it could be read.
#[derive(Debug, Serialize)]
pub struct CastVoteResponse {
    pub vote: VoteResponse,
    #[serde(flatten)]
    pub view: Option<ProposalViewResponse>,
}

pub async fn cast_vote<S: GovernanceStore + 'static>(
    State(state): State<AppState<S>>,
    Path((dao_id, proposal_id)): Path<(String, String)>,
    payload: Result<Json<CastVoteRequest>, JsonRejection>,
) -> Result<Json<CastVoteResponse>, RpcError> {
    let dao_id: DaoId = dao_id.parse()?;
    let proposal_id: ProposalId = proposal_id.parse()?;
    let Json(req) = payload?;
    let voter = WalletAddress::parse(&req.voter)?;
    let cast = match req.vote.parse::<VoteChoice>() {
        Ok(choice) => {
            blocking(&state, move |engine| {
                let proposal = engine.get_proposal(&proposal_id)?;
                if proposal.dao_id != dao_id {
                    return Err(GovernanceError::ProposalNotFound(proposal_id));
                }
                engine.cast_vote(&proposal_id, &voter, choice)
            })
            .await
        }
        Err(e) => Err(RpcError::from(e)),
    };

    let vote = match cast {
        Ok(vote) => {
            state.metrics.votes_cast.inc();
            vote
        }
        Err(e) => {
            warn!(proposal = %proposal_id, error = %e, "vote rejected");
            state
                .metrics
                .votes_rejected
                .with_label_values(&[e.kind()])
                .inc();
            return Err(e);
        }
    };

    // The vote is stored at this point; a failed re-read must not turn it into an error.
    let view = match blocking(&state, move |engine| engine.view_proposal(&proposal_id)).await {
        Ok(view) => Some(ProposalViewResponse::new(&view, Some(true))),
        Err(e) => {
            warn!(proposal = %proposal_id, error = %e, "vote recorded, proposal view unavailable");
            None
        }
    };
    Ok(Json(CastVoteResponse {
        vote: VoteResponse::from(&vote),
        view,
    }))
}

// ── Service ──────────────────────────────────────────────────────────────

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn metrics<S: GovernanceStore + 'static>(
    State(state): State<AppState<S>>,
) -> Result<impl IntoResponse, RpcError> {
    let body = state
        .metrics
        .encode()
        .map_err(|e| RpcError::Internal(e.to_string()))?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    ))
}
