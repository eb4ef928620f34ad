//! Configuration module for the hackathon backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::Duration;

use crate::errors::AppError;

/// Upper bound for `HACKATHON_INVITATION_TTL_HOURS` (one year).
pub const MAX_INVITATION_TTL_HOURS: i64 = 24 * 365;
/// Upper bound for `HACKATHON_OTP_TTL_MINUTES` (one day).
pub const MAX_OTP_TTL_MINUTES: i64 = 24 * 60;

/// Credentials for the Twilio Programmable Messaging API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

/// Which notification provider delivers OTP codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmsProvider {
    /// Log the code and keep it in memory
    Mock,
    /// Send a real SMS through Twilio
    Twilio(TwilioCredentials),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Frontend base URL used to build invite links
    pub base_url: String,
    /// How long an invitation stays joinable
    pub invitation_ttl: Duration,
    /// How long an OTP code stays verifiable
    pub otp_ttl: Duration,
    /// OTP delivery provider
    pub sms_provider: SmsProvider,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = lookup("HACKATHON_DB_PATH")
            .unwrap_or_else(|| "./data/hackathon.sqlite".to_string())
            .into();

        let bind_addr = lookup("HACKATHON_BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1:8000".to_string())
            .parse()
            .map_err(|e| invalid("HACKATHON_BIND_ADDR", e))?;

        let log_level = lookup("HACKATHON_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let base_url = lookup("HACKATHON_BASE_URL")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        let invitation_ttl = parse_ttl(
            &lookup,
            "HACKATHON_INVITATION_TTL_HOURS",
            48,
            MAX_INVITATION_TTL_HOURS,
            Duration::try_hours,
        )?;
        let otp_ttl = parse_ttl(
            &lookup,
            "HACKATHON_OTP_TTL_MINUTES",
            10,
            MAX_OTP_TTL_MINUTES,
            Duration::try_minutes,
        )?;

        let sms_provider = match lookup("HACKATHON_SMS_PROVIDER")
            .unwrap_or_else(|| "mock".to_string())
            .to_lowercase()
            .as_str()
        {
            "mock" => SmsProvider::Mock,
            "twilio" => SmsProvider::Twilio(TwilioCredentials {
                account_sid: required(&lookup, "TWILIO_ACCOUNT_SID")?,
                auth_token: required(&lookup, "TWILIO_AUTH_TOKEN")?,
                from_number: required(&lookup, "TWILIO_FROM_NUMBER")?,
            }),
            other => {
                return Err(AppError::Internal(format!(
                    "Invalid HACKATHON_SMS_PROVIDER '{}': expected 'mock' or 'twilio'",
                    other
                )))
            }
        };

        Ok(Self {
            db_path,
            bind_addr,
            log_level,
            base_url,
            invitation_ttl,
            otp_ttl,
            sms_provider,
        })
    }
}

fn invalid(key: &str, err: impl std::fmt::Display) -> AppError {
    AppError::Internal(format!("Invalid {} format: {}", key, err))
}

/// Parse a TTL in `1..=max` units and convert it with `to_duration`.
fn parse_ttl<F>(
    lookup: &F,
    key: &str,
    default: i64,
    max: i64,
    to_duration: fn(i64) -> Option<Duration>,
) -> Result<Duration, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = match lookup(key) {
        Some(raw) => raw.trim().parse::<i64>().map_err(|e| invalid(key, e))?,
        None => default,
    };
    if value <= 0 {
        return Err(AppError::Internal(format!("{} must be positive", key)));
    }
    if value > max {
        return Err(AppError::Internal(format!(
            "{} is out of range (max {})",
            key, max
        )));
    }
    to_duration(value).ok_or_else(|| AppError::Internal(format!("{} is out of range", key)))
}

fn required<F>(lookup: &F, key: &str) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Internal(format!("{} is required for the twilio provider", key)))
}
