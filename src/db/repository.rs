//! Database repository for CRUD operations.
//!
//! Uses prepared statements and transactions for data integrity.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{Row, Sqlite, SqlitePool};

use crate::clock::Clock;
use crate::errors::AppError;
use crate::models::{
    Invitation, InvitationTarget, Member, NewMember, NewOtp, NewTeam, Otp, Team, TeamChanges,
    TeamSummary, TeamWithMembers,
};

const TEAM_COLUMNS: &str =
    "id, name, leader_name, leader_email, description, max_members, created_at, updated_at";
const MEMBER_COLUMNS: &str = "id, team_id, name, email, phone, role, created_at";
const INVITATION_COLUMNS: &str =
    "id, team_id, email, phone, token, is_used, expires_at, created_at";
const OTP_COLUMNS: &str =
    "id, invitation_token, phone, code, is_verified, is_superseded, expires_at, created_at";

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl Repository {
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    // ==================== TEAM OPERATIONS ====================

    /// List teams with their member counts, oldest first.
    pub async fn list_teams(&self, skip: i64, limit: i64) -> Result<Vec<TeamSummary>, AppError> {
        let rows = sqlx::query(
            r#"SELECT t.id, t.name, t.leader_name, t.leader_email, t.description,
                      t.max_members, t.created_at, t.updated_at,
                      (SELECT COUNT(*) FROM members m WHERE m.team_id = t.id) AS member_count
               FROM teams t ORDER BY t.created_at, t.rowid LIMIT ? OFFSET ?"#,
        )
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| TeamSummary {
                team: team_from_row(row),
                member_count: row.get("member_count"),
            })
            .collect())
    }

    /// Get a team by ID.
    pub async fn get_team(&self, id: &str) -> Result<Option<Team>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM teams WHERE id = ?", TEAM_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(team_from_row))
    }

    /// Get a team by ID or fail with NotFound.
    pub async fn require_team(&self, id: &str) -> Result<Team, AppError> {
        self.get_team(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Team not found".to_string()))
    }

    /// Get a team together with its members.
    pub async fn get_team_with_members(&self, id: &str) -> Result<TeamWithMembers, AppError> {
        let team = self.require_team(id).await?;
        let members = self.list_members(id).await?;
        Ok(TeamWithMembers { team, members })
    }

    /// Count the members of a team.
    pub async fn count_members(&self, team_id: &str) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM members WHERE team_id = ?")
            .bind(team_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("count"))
    }

    /// Register a new team.
    pub async fn create_team(&self, new_team: &NewTeam) -> Result<Team, AppError> {
        if self.team_name_taken(&new_team.name, None).await? {
            return Err(AppError::Conflict("Team name already exists".to_string()));
        }

        let leader_taken = sqlx::query("SELECT 1 FROM teams WHERE leader_email = ?")
            .bind(&new_team.leader_email)
            .fetch_optional(&self.pool)
            .await?
            .is_some();
        if leader_taken {
            return Err(AppError::Conflict(
                "This email is already registered as a team leader".to_string(),
            ));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let now = self.clock.now();

        sqlx::query(&format!(
            "INSERT INTO teams ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            TEAM_COLUMNS
        ))
        .bind(&id)
        .bind(&new_team.name)
        .bind(&new_team.leader_name)
        .bind(&new_team.leader_email)
        .bind(&new_team.description)
        .bind(new_team.max_members)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Team {
            id,
            name: new_team.name.clone(),
            leader_name: new_team.leader_name.clone(),
            leader_email: new_team.leader_email.clone(),
            description: new_team.description.clone(),
            max_members: new_team.max_members,
            created_at: now,
            updated_at: now,
        })
    }

    /// Update a team. Capacity can never drop below the current member count.
    pub async fn update_team(&self, id: &str, changes: &TeamChanges) -> Result<Team, AppError> {
        let existing = self.require_team(id).await?;

        if let Some(name) = &changes.name {
            if self.team_name_taken(name, Some(id)).await? {
                return Err(AppError::Conflict("Team name already exists".to_string()));
            }
        }

        let name = changes.name.clone().unwrap_or(existing.name.clone());
        let description = match &changes.description {
            Some(d) if d.is_empty() => None,
            Some(d) => Some(d.clone()),
            None => existing.description.clone(),
        };
        let max_members = changes.max_members.unwrap_or(existing.max_members);
        let now = self.clock.now();

        // Conditional UPDATE so a concurrent join cannot slip past the new capacity
        let result = sqlx::query(
            r#"UPDATE teams SET name = ?, description = ?, max_members = ?, updated_at = ?
               WHERE id = ? AND ? >= (SELECT COUNT(*) FROM members WHERE team_id = ?)"#,
        )
        .bind(&name)
        .bind(&description)
        .bind(max_members)
        .bind(now)
        .bind(id)
        .bind(max_members)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let current = self.count_members(id).await?;
            return Err(AppError::Conflict(format!(
                "max_members cannot be lower than the current member count ({})",
                current
            )));
        }

        Ok(Team {
            id: id.to_string(),
            name,
            leader_name: existing.leader_name,
            leader_email: existing.leader_email,
            description,
            max_members,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    /// Delete a team together with its members, invitations and OTPs.
    pub async fn delete_team(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM teams WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Team not found".to_string()));
        }
        Ok(())
    }

    async fn team_name_taken(&self, name: &str, except_id: Option<&str>) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT 1 FROM teams WHERE name = ? AND id != ?")
            .bind(name)
            .bind(except_id.unwrap_or(""))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    // ==================== MEMBER OPERATIONS ====================

    /// List the members of a team in join order.
    pub async fn list_members(&self, team_id: &str) -> Result<Vec<Member>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM members WHERE team_id = ? ORDER BY created_at, rowid",
            MEMBER_COLUMNS
        ))
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(member_from_row).collect())
    }

    /// Whether an email already belongs to a member of the team.
    pub async fn member_email_exists(&self, team_id: &str, email: &str) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT 1 FROM members WHERE team_id = ? AND email = ?")
            .bind(team_id)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Add a member directly, bypassing invitations.
    pub async fn add_member(&self, team_id: &str, new_member: &NewMember) -> Result<Member, AppError> {
        let team = self.require_team(team_id).await?;

        if self.member_email_exists(team_id, &new_member.email).await? {
            return Err(AppError::Conflict(
                "Member with this email already exists in the team".to_string(),
            ));
        }

        let member = Member {
            id: uuid::Uuid::new_v4().to_string(),
            team_id: team_id.to_string(),
            name: new_member.name.clone(),
            email: new_member.email.clone(),
            phone: new_member.phone.clone(),
            role: new_member.role.clone(),
            created_at: self.clock.now(),
        };

        if insert_member_within_capacity(&self.pool, &member).await? == 0 {
            return Err(team_full(team.max_members));
        }
        Ok(member)
    }

    /// Remove a member from a team.
    pub async fn delete_member(&self, team_id: &str, member_id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM members WHERE id = ? AND team_id = ?")
            .bind(member_id)
            .bind(team_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(
                "Member not found in this team".to_string(),
            ));
        }
        Ok(())
    }

    // ==================== INVITATION OPERATIONS ====================

    /// Whether an invitation token is already in use.
    pub async fn token_exists(&self, token: &str) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT 1 FROM invitations WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Look up an invitation by its token.
    pub async fn get_invitation_by_token(&self, token: &str) -> Result<Option<Invitation>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM invitations WHERE token = ?",
            INVITATION_COLUMNS
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(invitation_from_row))
    }

    /// List a team's invitations, newest first.
    pub async fn list_invitations(&self, team_id: &str) -> Result<Vec<Invitation>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM invitations WHERE team_id = ? ORDER BY created_at DESC, rowid DESC",
            INVITATION_COLUMNS
        ))
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(invitation_from_row).collect())
    }

    /// Unused invitations addressed to an email within a team. Expiry is left
    /// to the caller.
    pub async fn unused_invitations_for(
        &self,
        team_id: &str,
        email: &str,
    ) -> Result<Vec<Invitation>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM invitations WHERE team_id = ? AND email = ? AND is_used = 0",
            INVITATION_COLUMNS
        ))
        .bind(team_id)
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(invitation_from_row).collect())
    }

    /// Store an invitation and, when a phone is given, its first OTP in one
    /// transaction.
    pub async fn create_invitation(
        &self,
        team_id: &str,
        target: &InvitationTarget,
        token: &str,
        expires_at: DateTime<Utc>,
        otp: Option<&NewOtp>,
    ) -> Result<Invitation, AppError> {
        let invitation = Invitation {
            id: uuid::Uuid::new_v4().to_string(),
            team_id: team_id.to_string(),
            email: target.email.clone(),
            phone: target.phone.clone(),
            token: token.to_string(),
            is_used: false,
            expires_at,
            created_at: self.clock.now(),
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!(
            "INSERT INTO invitations ({}) VALUES (?, ?, ?, ?, ?, 0, ?, ?)",
            INVITATION_COLUMNS
        ))
        .bind(&invitation.id)
        .bind(&invitation.team_id)
        .bind(&invitation.email)
        .bind(&invitation.phone)
        .bind(&invitation.token)
        .bind(invitation.expires_at)
        .bind(invitation.created_at)
        .execute(&mut *tx)
        .await?;

        if let Some(otp) = otp {
            insert_otp(&mut *tx, token, otp, invitation.created_at).await?;
        }

        tx.commit().await?;
        Ok(invitation)
    }

    // ==================== OTP OPERATIONS ====================

    /// The newest OTP of a token that has not been superseded by a resend.
    pub async fn current_otp(&self, token: &str) -> Result<Option<Otp>, AppError> {
        let row = sqlx::query(&format!(
            r#"SELECT {} FROM otps WHERE invitation_token = ? AND is_superseded = 0
               ORDER BY created_at DESC, rowid DESC LIMIT 1"#,
            OTP_COLUMNS
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(otp_from_row))
    }

    /// All verified OTPs of a token. Expiry is left to the caller.
    pub async fn verified_otps(&self, token: &str) -> Result<Vec<Otp>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM otps WHERE invitation_token = ? AND is_verified = 1",
            OTP_COLUMNS
        ))
        .bind(token)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(otp_from_row).collect())
    }

    /// Mark an OTP verified.
    pub async fn mark_otp_verified(&self, otp_id: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE otps SET is_verified = 1 WHERE id = ? AND is_superseded = 0")
            .bind(otp_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("OTP not found".to_string()));
        }
        Ok(())
    }

    /// Supersede every unverified OTP of a token and store a fresh one.
    pub async fn replace_otp(&self, token: &str, otp: &NewOtp) -> Result<Otp, AppError> {
        let now = self.clock.now();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE otps SET is_superseded = 1 WHERE invitation_token = ? AND is_verified = 0",
        )
        .bind(token)
        .execute(&mut *tx)
        .await?;

        let stored = insert_otp(&mut *tx, token, otp, now).await?;

        tx.commit().await?;
        Ok(stored)
    }

    // ==================== JOIN ====================

    /// Consume an invitation and create the member in one transaction.
    ///
    /// The used-flag flip runs first so the write lock is held before any
    /// capacity or duplicate check reads.
    pub async fn join_team(
        &self,
        invitation: &Invitation,
        name: &str,
        role: Option<&str>,
    ) -> Result<Member, AppError> {
        let mut tx = self.pool.begin().await?;

        let claimed = sqlx::query("UPDATE invitations SET is_used = 1 WHERE id = ? AND is_used = 0")
            .bind(&invitation.id)
            .execute(&mut *tx)
            .await?;
        if claimed.rows_affected() == 0 {
            return Err(AppError::AlreadyUsed(
                "This invitation has already been used".to_string(),
            ));
        }

        let duplicate = sqlx::query("SELECT 1 FROM members WHERE team_id = ? AND email = ?")
            .bind(&invitation.team_id)
            .bind(&invitation.email)
            .fetch_optional(&mut *tx)
            .await?
            .is_some();
        if duplicate {
            return Err(AppError::Conflict(
                "This email is already a member of the team".to_string(),
            ));
        }

        let member = Member {
            id: uuid::Uuid::new_v4().to_string(),
            team_id: invitation.team_id.clone(),
            name: name.to_string(),
            email: invitation.email.clone(),
            phone: invitation.phone.clone(),
            role: role.map(str::to_string),
            created_at: self.clock.now(),
        };

        if insert_member_within_capacity(&mut *tx, &member).await? == 0 {
            let max_row = sqlx::query("SELECT max_members FROM teams WHERE id = ?")
                .bind(&invitation.team_id)
                .fetch_optional(&mut *tx)
                .await?;
            return Err(match max_row {
                Some(row) => team_full(row.get("max_members")),
                None => AppError::NotFound("Team not found".to_string()),
            });
        }

        tx.commit().await?;
        Ok(member)
    }
}

// Helper functions shared by pool and transaction paths

/// Insert a member only while the team is below capacity. Returns rows inserted.
async fn insert_member_within_capacity<'e, E>(executor: E, member: &Member) -> Result<u64, AppError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"INSERT INTO members (id, team_id, name, email, phone, role, created_at)
           SELECT ?, ?, ?, ?, ?, ?, ?
           WHERE (SELECT COUNT(*) FROM members WHERE team_id = ?)
                 < (SELECT max_members FROM teams WHERE id = ?)"#,
    )
    .bind(&member.id)
    .bind(&member.team_id)
    .bind(&member.name)
    .bind(&member.email)
    .bind(&member.phone)
    .bind(&member.role)
    .bind(member.created_at)
    .bind(&member.team_id)
    .bind(&member.team_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

async fn insert_otp<'e, E>(
    executor: E,
    token: &str,
    otp: &NewOtp,
    created_at: DateTime<Utc>,
) -> Result<Otp, AppError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let stored = Otp {
        id: uuid::Uuid::new_v4().to_string(),
        invitation_token: token.to_string(),
        phone: otp.phone.clone(),
        code: otp.code.clone(),
        is_verified: false,
        expires_at: otp.expires_at,
        created_at,
    };

    sqlx::query(&format!(
        "INSERT INTO otps ({}) VALUES (?, ?, ?, ?, 0, 0, ?, ?)",
        OTP_COLUMNS
    ))
    .bind(&stored.id)
    .bind(&stored.invitation_token)
    .bind(&stored.phone)
    .bind(&stored.code)
    .bind(stored.expires_at)
    .bind(stored.created_at)
    .execute(executor)
    .await?;

    Ok(stored)
}

fn team_full(max_members: i64) -> AppError {
    AppError::Conflict(format!("Team is full (max {} members)", max_members))
}

fn team_from_row(row: &sqlx::sqlite::SqliteRow) -> Team {
    Team {
        id: row.get("id"),
        name: row.get("name"),
        leader_name: row.get("leader_name"),
        leader_email: row.get("leader_email"),
        description: row.get("description"),
        max_members: row.get("max_members"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn member_from_row(row: &sqlx::sqlite::SqliteRow) -> Member {
    Member {
        id: row.get("id"),
        team_id: row.get("team_id"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        role: row.get("role"),
        created_at: row.get("created_at"),
    }
}

fn invitation_from_row(row: &sqlx::sqlite::SqliteRow) -> Invitation {
    let is_used: i32 = row.get("is_used");
    Invitation {
        id: row.get("id"),
        team_id: row.get("team_id"),
        email: row.get("email"),
        phone: row.get("phone"),
        token: row.get("token"),
        is_used: is_used != 0,
        expires_at: row.get("expires_at"),
        created_at: row.get("created_at"),
    }
}

fn otp_from_row(row: &sqlx::sqlite::SqliteRow) -> Otp {
    let is_verified: i32 = row.get("is_verified");
    Otp {
        id: row.get("id"),
        invitation_token: row.get("invitation_token"),
        phone: row.get("phone"),
        code: row.get("code"),
        is_verified: is_verified != 0,
        expires_at: row.get("expires_at"),
        created_at: row.get("created_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::db::init_database;
    use tempfile::TempDir;

    async fn repo() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let pool = init_database(&temp_dir.path().join("test.sqlite"))
            .await
            .expect("Failed to init DB");
        let clock = Arc::new(ManualClock::new(Utc::now()));
        (Repository::new(pool, clock), temp_dir)
    }

    fn new_team(name: &str, leader_email: &str, max_members: i64) -> NewTeam {
        NewTeam {
            name: name.to_string(),
            leader_name: "Leader".to_string(),
            leader_email: leader_email.to_string(),
            description: None,
            max_members,
        }
    }

    fn new_member(email: &str) -> NewMember {
        NewMember {
            name: "Member".to_string(),
            email: email.to_string(),
            phone: None,
            role: None,
        }
    }

    #[tokio::test]
    async fn test_team_uniqueness() {
        let (repo, _dir) = repo().await;
        repo.create_team(&new_team("Alpha", "a@example.com", 5))
            .await
            .unwrap();

        let same_name = repo.create_team(&new_team("Alpha", "b@example.com", 5)).await;
        assert!(matches!(same_name, Err(AppError::Conflict(_))));

        let same_leader = repo.create_team(&new_team("Beta", "a@example.com", 5)).await;
        assert!(matches!(same_leader, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_add_member_respects_capacity() {
        let (repo, _dir) = repo().await;
        let team = repo
            .create_team(&new_team("Duo", "lead@example.com", 2))
            .await
            .unwrap();

        repo.add_member(&team.id, &new_member("one@example.com"))
            .await
            .unwrap();
        repo.add_member(&team.id, &new_member("two@example.com"))
            .await
            .unwrap();
        let third = repo.add_member(&team.id, &new_member("three@example.com")).await;

        assert!(matches!(third, Err(AppError::Conflict(_))));
        assert_eq!(repo.count_members(&team.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_member_email_rejected() {
        let (repo, _dir) = repo().await;
        let team = repo
            .create_team(&new_team("Dupes", "lead@example.com", 5))
            .await
            .unwrap();

        repo.add_member(&team.id, &new_member("same@example.com"))
            .await
            .unwrap();
        let again = repo.add_member(&team.id, &new_member("same@example.com")).await;
        assert!(matches!(again, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_cannot_shrink_below_member_count() {
        let (repo, _dir) = repo().await;
        let team = repo
            .create_team(&new_team("Shrink", "lead@example.com", 3))
            .await
            .unwrap();
        repo.add_member(&team.id, &new_member("one@example.com"))
            .await
            .unwrap();
        repo.add_member(&team.id, &new_member("two@example.com"))
            .await
            .unwrap();

        let too_small = TeamChanges {
            max_members: Some(1),
            ..Default::default()
        };
        assert!(matches!(
            repo.update_team(&team.id, &too_small).await,
            Err(AppError::Conflict(_))
        ));

        let fits = TeamChanges {
            max_members: Some(2),
            description: Some("Updated".to_string()),
            ..Default::default()
        };
        let updated = repo.update_team(&team.id, &fits).await.unwrap();
        assert_eq!(updated.max_members, 2);
        assert_eq!(updated.description.as_deref(), Some("Updated"));
    }

    #[tokio::test]
    async fn test_delete_team_cascades() {
        let (repo, _dir) = repo().await;
        let team = repo
            .create_team(&new_team("Gone", "lead@example.com", 5))
            .await
            .unwrap();
        repo.add_member(&team.id, &new_member("one@example.com"))
            .await
            .unwrap();
        let target = InvitationTarget {
            email: "two@example.com".to_string(),
            phone: Some("+15550001111".to_string()),
        };
        let otp = NewOtp {
            phone: "+15550001111".to_string(),
            code: "123456".to_string(),
            expires_at: Utc::now(),
        };
        repo.create_invitation(&team.id, &target, "tok", Utc::now(), Some(&otp))
            .await
            .unwrap();

        repo.delete_team(&team.id).await.unwrap();

        assert_eq!(repo.count_members(&team.id).await.unwrap(), 0);
        assert!(repo.get_invitation_by_token("tok").await.unwrap().is_none());
        assert!(repo.current_otp("tok").await.unwrap().is_none());
        assert!(matches!(
            repo.delete_team(&team.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_replace_otp_supersedes_previous() {
        let (repo, _dir) = repo().await;
        let team = repo
            .create_team(&new_team("Otp", "lead@example.com", 5))
            .await
            .unwrap();
        let target = InvitationTarget {
            email: "x@example.com".to_string(),
            phone: Some("+15550001111".to_string()),
        };
        let first = NewOtp {
            phone: "+15550001111".to_string(),
            code: "111111".to_string(),
            expires_at: Utc::now(),
        };
        repo.create_invitation(&team.id, &target, "tok", Utc::now(), Some(&first))
            .await
            .unwrap();

        let second = NewOtp {
            code: "222222".to_string(),
            ..first.clone()
        };
        repo.replace_otp("tok", &second).await.unwrap();

        let current = repo.current_otp("tok").await.unwrap().unwrap();
        assert_eq!(current.code, "222222");

        let row = sqlx::query(
            "SELECT COUNT(*) AS count FROM otps WHERE invitation_token = 'tok' AND is_superseded = 1",
        )
        .fetch_one(&repo.pool)
        .await
        .unwrap();
        let superseded: i64 = row.get("count");
        assert_eq!(superseded, 1);
    }
}
