//! Invitation lifecycle manager.
//!
//! An invitation is pending until it is used (terminal) or its expiry passes
//! (terminal, derived from the clock). Invitations carrying a phone number
//! additionally need a verified, unexpired OTP before they can be joined.

use std::sync::Arc;

use chrono::Duration;

use crate::clock::{is_expired, Clock};
use crate::config::Config;
use crate::db::Repository;
use crate::errors::AppError;
use crate::models::{
    Invitation, InvitationDetails, InvitationInfo, InvitationResponse, InvitationTarget, Member,
    NewOtp, OtpSentResponse, TeamBrief,
};
use crate::notify::OtpSender;
use crate::tokens::{constant_time_eq, generate_otp, generate_token};

/// Attempts at drawing a token that is not already stored.
const TOKEN_ATTEMPTS: usize = 5;

/// Tunables of the invitation lifecycle.
#[derive(Debug, Clone)]
pub struct InvitationSettings {
    pub base_url: String,
    pub invitation_ttl: Duration,
    pub otp_ttl: Duration,
}

impl InvitationSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.base_url.clone(),
            invitation_ttl: config.invitation_ttl,
            otp_ttl: config.otp_ttl,
        }
    }

    /// Link a prospective member opens to accept an invitation.
    pub fn invite_link(&self, token: &str) -> String {
        format!("{}/join/{}", self.base_url, token)
    }
}

/// Creates invitations, issues and verifies OTPs, and admits members.
pub struct InvitationService {
    repo: Arc<Repository>,
    sender: Arc<dyn OtpSender>,
    clock: Arc<dyn Clock>,
    settings: InvitationSettings,
}

impl InvitationService {
    pub fn new(
        repo: Arc<Repository>,
        sender: Arc<dyn OtpSender>,
        clock: Arc<dyn Clock>,
        settings: InvitationSettings,
    ) -> Self {
        Self {
            repo,
            sender,
            clock,
            settings,
        }
    }

    /// Create an invitation and, when a phone is given, send its first OTP.
    ///
    /// A failed send leaves the invitation and OTP stored; the returned
    /// provider error carries the token so the caller can resend.
    pub async fn create_invitation(
        &self,
        team_id: &str,
        target: &InvitationTarget,
    ) -> Result<InvitationResponse, AppError> {
        let team = self.repo.require_team(team_id).await?;

        let member_count = self.repo.count_members(team_id).await?;
        if member_count >= team.max_members {
            return Err(AppError::Conflict(format!(
                "Team is full (max {} members)",
                team.max_members
            )));
        }

        let now = self.clock.now();
        let pending = self
            .repo
            .unused_invitations_for(team_id, &target.email)
            .await?;
        if pending.iter().any(|inv| !is_expired(inv.expires_at, now)) {
            return Err(AppError::Conflict(
                "An active invitation already exists for this email".to_string(),
            ));
        }

        if self.repo.member_email_exists(team_id, &target.email).await? {
            return Err(AppError::Conflict(
                "This email is already a member of the team".to_string(),
            ));
        }

        let token = self.unique_token().await?;
        let expires_at = now + self.settings.invitation_ttl;
        let otp = target.phone.as_ref().map(|phone| NewOtp {
            phone: phone.clone(),
            code: generate_otp(),
            expires_at: now + self.settings.otp_ttl,
        });

        let invitation = self
            .repo
            .create_invitation(team_id, target, &token, expires_at, otp.as_ref())
            .await?;
        tracing::info!(
            team_id = %team_id,
            invitation_id = %invitation.id,
            requires_otp = invitation.requires_otp(),
            "Invitation created"
        );

        if let Some(otp) = &otp {
            self.sender
                .send_otp(&otp.phone, &otp.code)
                .await
                .map_err(|e| e.with_invitation_token(&token))?;
            tracing::info!(invitation_id = %invitation.id, "OTP issued");
        }

        Ok(self.to_response(invitation))
    }

    /// All invitations of a team with their links.
    pub async fn list_invitations(
        &self,
        team_id: &str,
    ) -> Result<Vec<InvitationResponse>, AppError> {
        self.repo.require_team(team_id).await?;
        let invitations = self.repo.list_invitations(team_id).await?;
        Ok(invitations
            .into_iter()
            .map(|inv| self.to_response(inv))
            .collect())
    }

    /// Public details of an invitation. Used and expired invitations are
    /// still described; nothing is mutated.
    pub async fn get_invitation_details(&self, token: &str) -> Result<InvitationDetails, AppError> {
        let invitation = self.require_invitation(token).await?;
        let team = self.repo.require_team(&invitation.team_id).await?;
        let member_count = self.repo.count_members(&team.id).await?;
        let now = self.clock.now();

        Ok(InvitationDetails {
            invitation: InvitationInfo {
                requires_otp: invitation.requires_otp(),
                is_expired: is_expired(invitation.expires_at, now),
                is_used: invitation.is_used,
                email: invitation.email,
                phone: invitation.phone,
                expires_at: invitation.expires_at,
            },
            team: TeamBrief {
                id: team.id,
                name: team.name,
                leader_name: team.leader_name,
                description: team.description,
                max_members: team.max_members,
                member_count,
            },
        })
    }

    /// Verify the current OTP of an invitation. Does not consume the invitation.
    pub async fn verify_otp(&self, token: &str, code: &str) -> Result<(), AppError> {
        let invitation = self.require_invitation(token).await?;
        let otp = self
            .repo
            .current_otp(token)
            .await?
            .ok_or_else(|| AppError::NotFound("No OTP found for this invitation".to_string()))?;

        if invitation.is_used {
            return Err(already_used());
        }

        let now = self.clock.now();
        if is_expired(invitation.expires_at, now) {
            return Err(invitation_expired());
        }
        if is_expired(otp.expires_at, now) {
            return Err(AppError::Expired(
                "OTP has expired. Please request a new one.".to_string(),
            ));
        }

        if !constant_time_eq(&otp.code, code) {
            tracing::info!(invitation_id = %invitation.id, "OTP mismatch");
            return Err(AppError::InvalidOtp("Invalid OTP code".to_string()));
        }

        if !otp.is_verified {
            self.repo.mark_otp_verified(&otp.id).await?;
        }
        tracing::info!(invitation_id = %invitation.id, "OTP verified");
        Ok(())
    }

    /// Replace the pending OTP of an invitation with a fresh one and send it.
    pub async fn resend_otp(&self, token: &str) -> Result<OtpSentResponse, AppError> {
        let invitation = self.require_invitation(token).await?;

        let Some(phone) = invitation.phone.clone() else {
            return Err(AppError::Validation(
                "This invitation does not have a phone number".to_string(),
            ));
        };
        if invitation.is_used {
            return Err(already_used());
        }
        let now = self.clock.now();
        if is_expired(invitation.expires_at, now) {
            return Err(invitation_expired());
        }

        let new_otp = NewOtp {
            phone: phone.clone(),
            code: generate_otp(),
            expires_at: now + self.settings.otp_ttl,
        };
        let stored = self.repo.replace_otp(token, &new_otp).await?;
        tracing::info!(invitation_id = %invitation.id, "OTP reissued");

        self.sender
            .send_otp(&phone, &stored.code)
            .await
            .map_err(|e| e.with_invitation_token(token))?;

        Ok(OtpSentResponse {
            message: "OTP sent successfully".to_string(),
            phone,
            expires_at: stored.expires_at,
        })
    }

    /// Admit the invitee into the team and consume the invitation.
    pub async fn join_team(
        &self,
        token: &str,
        name: &str,
        role: Option<&str>,
    ) -> Result<Member, AppError> {
        let invitation = self.require_invitation(token).await?;

        if invitation.is_used {
            return Err(already_used());
        }
        let now = self.clock.now();
        if is_expired(invitation.expires_at, now) {
            return Err(invitation_expired());
        }

        if invitation.requires_otp() {
            let verified = self.repo.verified_otps(token).await?;
            if !verified.iter().any(|otp| !is_expired(otp.expires_at, now)) {
                return Err(AppError::OtpRequired(
                    "OTP verification required. Please verify your phone number first."
                        .to_string(),
                ));
            }
        }

        let member = self.repo.join_team(&invitation, name, role).await?;
        tracing::info!(
            team_id = %member.team_id,
            member_id = %member.id,
            "Member joined via invitation"
        );
        Ok(member)
    }

    async fn require_invitation(&self, token: &str) -> Result<Invitation, AppError> {
        self.repo
            .get_invitation_by_token(token)
            .await?
            .ok_or_else(|| AppError::NotFound("Invitation not found".to_string()))
    }

    async fn unique_token(&self) -> Result<String, AppError> {
        for _ in 0..TOKEN_ATTEMPTS {
            let token = generate_token();
            if !self.repo.token_exists(&token).await? {
                return Ok(token);
            }
            tracing::warn!("Invitation token collision, retrying");
        }
        Err(AppError::Internal(
            "Could not generate a unique invitation token".to_string(),
        ))
    }

    fn to_response(&self, invitation: Invitation) -> InvitationResponse {
        InvitationResponse {
            invite_link: self.settings.invite_link(&invitation.token),
            is_expired: is_expired(invitation.expires_at, self.clock.now()),
            invitation,
        }
    }
}

fn already_used() -> AppError {
    AppError::AlreadyUsed("This invitation has already been used".to_string())
}

fn invitation_expired() -> AppError {
    AppError::Expired("This invitation has expired".to_string())
}
