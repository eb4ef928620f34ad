//! Team model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{require_text, validate_email, Member, MAX_TEXT_LEN};
use crate::errors::AppError;

/// Smallest allowed team size.
pub const MIN_TEAM_SIZE: i64 = 1;
/// Largest allowed team size.
pub const MAX_TEAM_SIZE: i64 = 20;

/// A registered hackathon team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub leader_name: String,
    pub leader_email: String,
    pub description: Option<String>,
    pub max_members: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A team together with its members.
#[derive(Debug, Clone, Serialize)]
pub struct TeamWithMembers {
    #[serde(flatten)]
    pub team: Team,
    pub members: Vec<Member>,
}

/// A team with its member count, used for listings.
#[derive(Debug, Clone, Serialize)]
pub struct TeamSummary {
    #[serde(flatten)]
    pub team: Team,
    pub member_count: i64,
}

/// Request body for registering a team.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTeamRequest {
    pub name: String,
    pub leader_name: String,
    pub leader_email: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_max_members")]
    pub max_members: i64,
}

fn default_max_members() -> i64 {
    5
}

/// Validated team registration.
#[derive(Debug, Clone)]
pub struct NewTeam {
    pub name: String,
    pub leader_name: String,
    pub leader_email: String,
    pub description: Option<String>,
    pub max_members: i64,
}

impl CreateTeamRequest {
    pub fn validate(&self) -> Result<NewTeam, AppError> {
        Ok(NewTeam {
            name: require_text("name", &self.name, MAX_TEXT_LEN)?,
            leader_name: require_text("leader_name", &self.leader_name, MAX_TEXT_LEN)?,
            leader_email: validate_email("leader_email", &self.leader_email)?,
            description: self
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            max_members: validate_max_members(self.max_members)?,
        })
    }
}

/// Request body for updating a team. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTeamRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub max_members: Option<i64>,
}

/// Validated team update.
#[derive(Debug, Clone, Default)]
pub struct TeamChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub max_members: Option<i64>,
}

impl UpdateTeamRequest {
    pub fn validate(&self) -> Result<TeamChanges, AppError> {
        let name = match &self.name {
            Some(name) => Some(require_text("name", name, MAX_TEXT_LEN)?),
            None => None,
        };
        let max_members = self.max_members.map(validate_max_members).transpose()?;

        Ok(TeamChanges {
            name,
            description: self.description.as_ref().map(|d| d.trim().to_string()),
            max_members,
        })
    }
}

/// Pagination parameters for listing teams.
#[derive(Debug, Clone, Deserialize)]
pub struct ListTeamsQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

impl ListTeamsQuery {
    pub fn validate(&self) -> Result<(i64, i64), AppError> {
        if self.skip < 0 {
            return Err(AppError::Validation("skip must not be negative".to_string()));
        }
        if !(1..=100).contains(&self.limit) {
            return Err(AppError::Validation(
                "limit must be between 1 and 100".to_string(),
            ));
        }
        Ok((self.skip, self.limit))
    }
}

fn validate_max_members(value: i64) -> Result<i64, AppError> {
    if !(MIN_TEAM_SIZE..=MAX_TEAM_SIZE).contains(&value) {
        return Err(AppError::Validation(format!(
            "max_members must be between {} and {}",
            MIN_TEAM_SIZE, MAX_TEAM_SIZE
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateTeamRequest {
        CreateTeamRequest {
            name: " Innovation Squad ".to_string(),
            leader_name: "Alice Johnson".to_string(),
            leader_email: "Alice@InnovationSquad.com".to_string(),
            description: Some("  ".to_string()),
            max_members: 5,
        }
    }

    #[test]
    fn test_create_team_validation_normalizes() {
        let team = request().validate().unwrap();
        assert_eq!(team.name, "Innovation Squad");
        assert_eq!(team.leader_email, "alice@innovationsquad.com");
        assert_eq!(team.description, None);
        assert_eq!(team.max_members, 5);
    }

    #[test]
    fn test_max_members_bounds() {
        for bad in [0, 21, -3] {
            let mut req = request();
            req.max_members = bad;
            assert!(req.validate().is_err(), "max_members {} accepted", bad);
        }
        for good in [1, 20] {
            let mut req = request();
            req.max_members = good;
            assert!(req.validate().is_ok());
        }
    }

    #[test]
    fn test_default_max_members() {
        let req: CreateTeamRequest = serde_json::from_value(serde_json::json!({
            "name": "Team",
            "leader_name": "Lead",
            "leader_email": "lead@example.com"
        }))
        .unwrap();
        assert_eq!(req.max_members, 5);
    }

    #[test]
    fn test_update_validation() {
        let changes = UpdateTeamRequest {
            name: Some(" Renamed ".to_string()),
            description: None,
            max_members: Some(3),
        }
        .validate()
        .unwrap();
        assert_eq!(changes.name.as_deref(), Some("Renamed"));
        assert_eq!(changes.max_members, Some(3));

        let bad = UpdateTeamRequest {
            max_members: Some(25),
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let blank_name = UpdateTeamRequest {
            name: Some("".to_string()),
            ..Default::default()
        };
        assert!(blank_name.validate().is_err());
    }

    #[test]
    fn test_list_query_bounds() {
        let ok = ListTeamsQuery { skip: 0, limit: 100 };
        assert_eq!(ok.validate().unwrap(), (0, 100));
        assert!(ListTeamsQuery { skip: -1, limit: 10 }.validate().is_err());
        assert!(ListTeamsQuery { skip: 0, limit: 0 }.validate().is_err());
        assert!(ListTeamsQuery { skip: 0, limit: 101 }.validate().is_err());
    }
}
