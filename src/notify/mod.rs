//! OTP delivery.
//!
//! The lifecycle manager only sees the [`OtpSender`] capability; which
//! provider backs it is decided once at startup from configuration.

mod mock;
mod twilio;

pub use mock::*;
pub use twilio::*;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;

use crate::config::SmsProvider;
use crate::errors::AppError;

/// Delivers an OTP code to a phone number.
#[async_trait]
pub trait OtpSender: Send + Sync {
    /// Send `code` to `phone` (E.164). Failure is reported as [`AppError::Provider`].
    async fn send_otp(&self, phone: &str, code: &str) -> Result<(), AppError>;
}

/// Text of the SMS carrying the code.
pub fn otp_message(code: &str, ttl: Duration) -> String {
    format!(
        "Your OTP for hackathon team invitation is: {}. Valid for {} minutes.",
        code,
        ttl.num_minutes()
    )
}

/// Build the sender selected by configuration.
pub fn sender_from_config(
    provider: &SmsProvider,
    otp_ttl: Duration,
) -> Result<Arc<dyn OtpSender>, AppError> {
    match provider {
        SmsProvider::Mock => {
            tracing::warn!("Using mock SMS provider; OTP codes are only written to the log");
            Ok(Arc::new(MockOtpSender::new(otp_ttl)))
        }
        SmsProvider::Twilio(credentials) => {
            tracing::info!("Using Twilio SMS provider");
            Ok(Arc::new(TwilioOtpSender::new(credentials.clone(), otp_ttl)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_message() {
        assert_eq!(
            otp_message("042137", Duration::minutes(10)),
            "Your OTP for hackathon team invitation is: 042137. Valid for 10 minutes."
        );
    }
}
