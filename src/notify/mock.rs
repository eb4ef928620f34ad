//! Mock sender for environments without an SMS provider.

use async_trait::async_trait;
use chrono::Duration;
use tokio::sync::Mutex;

use super::{otp_message, OtpSender};
use crate::errors::AppError;

/// An OTP the mock sender was asked to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(not(test), allow(dead_code))]
pub struct SentOtp {
    pub phone: String,
    pub code: String,
}

/// Logs each code and keeps it in memory.
pub struct MockOtpSender {
    otp_ttl: Duration,
    sent: Mutex<Vec<SentOtp>>,
}

impl MockOtpSender {
    pub fn new(otp_ttl: Duration) -> Self {
        Self {
            otp_ttl,
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Every OTP sent so far, oldest first.
    #[cfg(test)]
    pub async fn sent(&self) -> Vec<SentOtp> {
        self.sent.lock().await.clone()
    }

    /// The most recent code sent to a phone number.
    #[cfg(test)]
    pub async fn last_code_for(&self, phone: &str) -> Option<String> {
        self.sent
            .lock()
            .await
            .iter()
            .rev()
            .find(|s| s.phone == phone)
            .map(|s| s.code.clone())
    }
}

#[async_trait]
impl OtpSender for MockOtpSender {
    async fn send_otp(&self, phone: &str, code: &str) -> Result<(), AppError> {
        tracing::info!(
            to = %phone,
            message = %otp_message(code, self.otp_ttl),
            "Mock SMS sent"
        );
        self.sent.lock().await.push(SentOtp {
            phone: phone.to_string(),
            code: code.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_records_sent_codes() {
        let sender = MockOtpSender::new(Duration::minutes(10));
        sender.send_otp("+15550001111", "111111").await.unwrap();
        sender.send_otp("+15550002222", "222222").await.unwrap();
        sender.send_otp("+15550001111", "333333").await.unwrap();

        assert_eq!(sender.sent().await.len(), 3);
        assert_eq!(
            sender.last_code_for("+15550001111").await.as_deref(),
            Some("333333")
        );
        assert_eq!(sender.last_code_for("+15559999999").await, None);
    }
}
