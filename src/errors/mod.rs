//! Error handling module for the hackathon backend.
//!
//! Provides centralized error types with mapping to HTTP status codes and response envelopes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const CONFLICT: &str = "CONFLICT";
    pub const EXPIRED: &str = "EXPIRED";
    pub const ALREADY_USED: &str = "ALREADY_USED";
    pub const INVALID_OTP: &str = "INVALID_OTP";
    pub const OTP_REQUIRED: &str = "OTP_REQUIRED";
    pub const PROVIDER_ERROR: &str = "PROVIDER_ERROR";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Malformed or out-of-range input
    Validation(String),
    /// Team, member, invitation or OTP absent
    NotFound(String),
    /// Duplicate name/email or team full
    Conflict(String),
    /// Invitation or OTP past its TTL
    Expired(String),
    /// Invitation already consumed
    AlreadyUsed(String),
    /// OTP code mismatch
    InvalidOtp(String),
    /// Phone-bearing invitation joined without a verified OTP
    OtpRequired(String),
    /// Notification dispatch failed; persisted records are kept
    Provider {
        message: String,
        invitation_token: Option<String>,
    },
    /// Database error
    Database(String),
    /// Internal server error
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::Conflict(_)
            | AppError::Expired(_)
            | AppError::AlreadyUsed(_)
            | AppError::InvalidOtp(_)
            | AppError::OtpRequired(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Provider { .. } | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Conflict(_) => codes::CONFLICT,
            AppError::Expired(_) => codes::EXPIRED,
            AppError::AlreadyUsed(_) => codes::ALREADY_USED,
            AppError::InvalidOtp(_) => codes::INVALID_OTP,
            AppError::OtpRequired(_) => codes::OTP_REQUIRED,
            AppError::Provider { .. } => codes::PROVIDER_ERROR,
            AppError::Database(_) => codes::DATABASE_ERROR,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> &str {
        match self {
            AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::Expired(msg)
            | AppError::AlreadyUsed(msg)
            | AppError::InvalidOtp(msg)
            | AppError::OtpRequired(msg)
            | AppError::Database(msg)
            | AppError::Internal(msg) => msg,
            AppError::Provider { message, .. } => message,
        }
    }

    /// Attach the invitation token to a provider failure.
    pub fn with_invitation_token(self, token: &str) -> Self {
        match self {
            AppError::Provider { message, .. } => AppError::Provider {
                message,
                invitation_token: Some(token.to_string()),
            },
            other => other,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                tracing::debug!("Unique constraint violated: {}", db_err.message());
                return AppError::Conflict(format!("Duplicate record: {}", db_err.message()));
            }
        }
        tracing::error!("Database error: {:?}", err);
        AppError::Database(format!("Database error: {}", err))
    }
}

/// Error details in the response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        let details = match error {
            AppError::Provider {
                invitation_token: Some(token),
                ..
            } => Some(serde_json::json!({ "invitation_token": token })),
            _ => None,
        };

        Self {
            success: false,
            error: ErrorDetails {
                code: error.error_code().to_string(),
                message: error.message().to_string(),
                details,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse::new(&self);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_rule_errors_are_bad_request() {
        let errors = [
            AppError::Validation("v".into()),
            AppError::Conflict("c".into()),
            AppError::Expired("e".into()),
            AppError::AlreadyUsed("u".into()),
            AppError::InvalidOtp("i".into()),
            AppError::OtpRequired("o".into()),
        ];
        for err in errors {
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST, "{}", err);
        }
    }

    #[test]
    fn test_not_found_and_server_errors() {
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Database("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let provider = AppError::Provider {
            message: "down".into(),
            invitation_token: None,
        };
        assert_eq!(provider.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(provider.error_code(), codes::PROVIDER_ERROR);
    }

    #[test]
    fn test_provider_error_carries_token_in_details() {
        let err = AppError::Provider {
            message: "SMS failed".into(),
            invitation_token: None,
        }
        .with_invitation_token("abc");

        let body = ErrorResponse::new(&err);
        assert!(!body.success);
        assert_eq!(body.error.code, "PROVIDER_ERROR");
        assert_eq!(body.error.details.unwrap()["invitation_token"], "abc");
    }

    #[test]
    fn test_with_invitation_token_leaves_other_errors() {
        let err = AppError::Expired("gone".into()).with_invitation_token("abc");
        assert!(matches!(err, AppError::Expired(_)));
        assert!(ErrorResponse::new(&err).error.details.is_none());
    }

    #[test]
    fn test_display() {
        let err = AppError::AlreadyUsed("This invitation has already been used".into());
        assert_eq!(
            err.to_string(),
            "ALREADY_USED: This invitation has already been used"
        );
    }
}
