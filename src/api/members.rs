//! Member API endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};

use super::{created, success, ApiResult, Json};
use crate::errors::AppError;
use crate::models::{CreateMemberRequest, Member};
use crate::AppState;

/// POST /api/teams/{id}/members - Add a member directly.
pub async fn add_member(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    Json(request): Json<CreateMemberRequest>,
) -> ApiResult<Member> {
    let new_member = request.validate()?;
    let member = state.repo.add_member(&team_id, &new_member).await?;
    tracing::info!(team_id = %team_id, member_id = %member.id, "Member added");
    created(member)
}

/// GET /api/teams/{id}/members - List the members of a team.
pub async fn list_members(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
) -> ApiResult<Vec<Member>> {
    state.repo.require_team(&team_id).await?;
    success(state.repo.list_members(&team_id).await?)
}

/// DELETE /api/teams/{id}/members/{member_id} - Remove a member.
pub async fn remove_member(
    State(state): State<AppState>,
    Path((team_id, member_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    state.repo.require_team(&team_id).await?;
    state.repo.delete_member(&team_id, &member_id).await?;
    tracing::info!(team_id = %team_id, member_id = %member_id, "Member removed");
    Ok(StatusCode::NO_CONTENT)
}
