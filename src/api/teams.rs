//! Team API endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};

use super::{created, success, ApiResult, Json, Query};
use crate::errors::AppError;
use crate::models::{
    CreateTeamRequest, ListTeamsQuery, Team, TeamSummary, TeamWithMembers, UpdateTeamRequest,
};
use crate::AppState;

/// POST /api/teams - Register a new team.
pub async fn create_team(
    State(state): State<AppState>,
    Json(request): Json<CreateTeamRequest>,
) -> ApiResult<Team> {
    let new_team = request.validate()?;
    let team = state.repo.create_team(&new_team).await?;
    tracing::info!(team_id = %team.id, name = %team.name, "Team created");
    created(team)
}

/// GET /api/teams - List teams with member counts.
pub async fn list_teams(
    State(state): State<AppState>,
    Query(query): Query<ListTeamsQuery>,
) -> ApiResult<Vec<TeamSummary>> {
    let (skip, limit) = query.validate()?;
    success(state.repo.list_teams(skip, limit).await?)
}

/// GET /api/teams/{id} - Get a team and its members.
pub async fn get_team(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<TeamWithMembers> {
    success(state.repo.get_team_with_members(&id).await?)
}

/// PUT /api/teams/{id} - Update name, description or capacity.
pub async fn update_team(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateTeamRequest>,
) -> ApiResult<Team> {
    let changes = request.validate()?;
    let team = state.repo.update_team(&id, &changes).await?;
    tracing::info!(team_id = %team.id, "Team updated");
    success(team)
}

/// DELETE /api/teams/{id} - Delete a team with its members and invitations.
pub async fn delete_team(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.repo.delete_team(&id).await?;
    tracing::info!(team_id = %id, "Team deleted");
    Ok(StatusCode::NO_CONTENT)
}
