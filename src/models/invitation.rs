//! Invitation and OTP models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{optional_text, require_text, validate_email, validate_phone, MAX_TEXT_LEN};
use crate::errors::AppError;
use crate::tokens::OTP_LENGTH;

/// A single-use, time-limited invitation to join a team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitation {
    pub id: String,
    pub team_id: String,
    pub email: String,
    pub phone: Option<String>,
    pub token: String,
    pub is_used: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    pub fn requires_otp(&self) -> bool {
        self.phone.is_some()
    }
}

/// A one-time code bound to an invitation token. Never serialized to clients.
#[derive(Debug, Clone)]
pub struct Otp {
    pub id: String,
    pub invitation_token: String,
    pub phone: String,
    pub code: String,
    pub is_verified: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// An OTP about to be stored.
#[derive(Debug, Clone)]
pub struct NewOtp {
    pub phone: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// Invitation as returned to the team, with its shareable link.
#[derive(Debug, Clone, Serialize)]
pub struct InvitationResponse {
    #[serde(flatten)]
    pub invitation: Invitation,
    pub invite_link: String,
    pub is_expired: bool,
}

/// Request body for creating an invitation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvitationRequest {
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Validated invitation target.
#[derive(Debug, Clone)]
pub struct InvitationTarget {
    pub email: String,
    pub phone: Option<String>,
}

impl CreateInvitationRequest {
    pub fn validate(&self) -> Result<InvitationTarget, AppError> {
        Ok(InvitationTarget {
            email: validate_email("email", &self.email)?,
            phone: validate_phone(self.phone.as_deref())?,
        })
    }
}

/// Public view of an invitation, shown to whoever opens the link.
#[derive(Debug, Clone, Serialize)]
pub struct InvitationDetails {
    pub invitation: InvitationInfo,
    pub team: TeamBrief,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvitationInfo {
    pub email: String,
    pub phone: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub is_used: bool,
    pub is_expired: bool,
    pub requires_otp: bool,
}

/// Team summary embedded in invitation details.
#[derive(Debug, Clone, Serialize)]
pub struct TeamBrief {
    pub id: String,
    pub name: String,
    pub leader_name: String,
    pub description: Option<String>,
    pub max_members: i64,
    pub member_count: i64,
}

/// Request body for verifying an OTP.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyOtpRequest {
    pub invitation_token: String,
    pub otp_code: String,
}

impl VerifyOtpRequest {
    /// Returns the trimmed `(token, code)` pair.
    pub fn validate(&self) -> Result<(String, String), AppError> {
        let token = require_text("invitation_token", &self.invitation_token, MAX_TEXT_LEN)?;
        let code = self.otp_code.trim();
        if code.len() != OTP_LENGTH || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::Validation(format!(
                "otp_code must be {} digits",
                OTP_LENGTH
            )));
        }
        Ok((token, code.to_string()))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyOtpResponse {
    pub message: String,
    pub verified: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct OtpSentResponse {
    pub message: String,
    pub phone: String,
    pub expires_at: DateTime<Utc>,
}

/// Request body for joining a team through an invitation.
#[derive(Debug, Clone, Deserialize)]
pub struct JoinTeamRequest {
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
}

impl JoinTeamRequest {
    /// Returns the trimmed `(name, role)` pair.
    pub fn validate(&self) -> Result<(String, Option<String>), AppError> {
        Ok((
            require_text("name", &self.name, MAX_TEXT_LEN)?,
            optional_text("role", self.role.as_deref(), MAX_TEXT_LEN)?,
        ))
    }
}
