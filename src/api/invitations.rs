//! Invitation API endpoints.

use axum::extract::{Path, State};

use super::{created, success, ApiResult, Json};
use crate::models::{
    CreateInvitationRequest, InvitationDetails, InvitationResponse, JoinTeamRequest, Member,
    OtpSentResponse, VerifyOtpRequest, VerifyOtpResponse,
};
use crate::AppState;

/// POST /api/teams/{id}/invitations - Invite someone to a team.
pub async fn create_invitation(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    Json(request): Json<CreateInvitationRequest>,
) -> ApiResult<InvitationResponse> {
    let target = request.validate()?;
    created(state.invitations.create_invitation(&team_id, &target).await?)
}

/// GET /api/teams/{id}/invitations - List a team's invitations.
pub async fn list_invitations(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
) -> ApiResult<Vec<InvitationResponse>> {
    success(state.invitations.list_invitations(&team_id).await?)
}

/// GET /api/invitations/{token} - Public invitation details.
pub async fn get_invitation(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<InvitationDetails> {
    success(state.invitations.get_invitation_details(&token).await?)
}

/// POST /api/invitations/verify-otp - Verify the code sent to the invitee.
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(request): Json<VerifyOtpRequest>,
) -> ApiResult<VerifyOtpResponse> {
    let (token, code) = request.validate()?;
    state.invitations.verify_otp(&token, &code).await?;
    success(VerifyOtpResponse {
        message: "OTP verified successfully".to_string(),
        verified: true,
    })
}

/// POST /api/invitations/{token}/resend-otp - Issue a fresh code.
pub async fn resend_otp(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<OtpSentResponse> {
    success(state.invitations.resend_otp(&token).await?)
}

/// POST /api/invitations/{token}/join - Accept the invitation.
pub async fn join_team(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(request): Json<JoinTeamRequest>,
) -> ApiResult<Member> {
    let (name, role) = request.validate()?;
    created(
        state
            .invitations
            .join_team(&token, &name, role.as_deref())
            .await?,
    )
}
