//! Team member model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{optional_text, require_text, validate_email, validate_phone, MAX_TEXT_LEN};
use crate::errors::AppError;

/// A member of exactly one team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub team_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request body for adding a member directly to a team.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMemberRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Validated member, ready to insert under a team.
#[derive(Debug, Clone)]
pub struct NewMember {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Option<String>,
}

impl CreateMemberRequest {
    pub fn validate(&self) -> Result<NewMember, AppError> {
        Ok(NewMember {
            name: require_text("name", &self.name, MAX_TEXT_LEN)?,
            email: validate_email("email", &self.email)?,
            phone: validate_phone(self.phone.as_deref())?,
            role: optional_text("role", self.role.as_deref(), MAX_TEXT_LEN)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_member_validation() {
        let member = CreateMemberRequest {
            name: " Bob ".to_string(),
            email: "BOB@example.com".to_string(),
            phone: Some("919876543210".to_string()),
            role: Some("".to_string()),
        }
        .validate()
        .unwrap();

        assert_eq!(member.name, "Bob");
        assert_eq!(member.email, "bob@example.com");
        assert_eq!(member.phone.as_deref(), Some("+919876543210"));
        assert_eq!(member.role, None);
    }

    #[test]
    fn test_create_member_rejects_bad_email() {
        let result = CreateMemberRequest {
            name: "Bob".to_string(),
            email: "not-an-email".to_string(),
            phone: None,
            role: None,
        }
        .validate();
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
