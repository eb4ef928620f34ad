//! Twilio Programmable Messaging sender.

use std::collections::HashMap;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::Duration;
use reqwest::Client;
use serde::Deserialize;

use super::{otp_message, OtpSender};
use crate::config::TwilioCredentials;
use crate::errors::AppError;

const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";
const REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(10);

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: String,
}

/// Sends OTP codes as SMS through the Twilio REST API.
pub struct TwilioOtpSender {
    client: Client,
    credentials: TwilioCredentials,
    api_base: String,
    otp_ttl: Duration,
}

impl TwilioOtpSender {
    pub fn new(credentials: TwilioCredentials, otp_ttl: Duration) -> Result<Self, AppError> {
        Self::with_api_base(credentials, otp_ttl, TWILIO_API_BASE)
    }

    /// Point the sender at a different API root.
    pub fn with_api_base(
        credentials: TwilioCredentials,
        otp_ttl: Duration,
        api_base: &str,
    ) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            credentials,
            api_base: api_base.trim_end_matches('/').to_string(),
            otp_ttl,
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/Accounts/{}/Messages.json",
            self.api_base, self.credentials.account_sid
        )
    }
}

fn provider_error(message: String) -> AppError {
    tracing::warn!("{}", message);
    AppError::Provider {
        message,
        invitation_token: None,
    }
}

#[async_trait]
impl OtpSender for TwilioOtpSender {
    async fn send_otp(&self, phone: &str, code: &str) -> Result<(), AppError> {
        let body = otp_message(code, self.otp_ttl);

        let mut form: HashMap<&str, &str> = HashMap::new();
        form.insert("To", phone);
        form.insert("From", &self.credentials.from_number);
        form.insert("Body", &body);

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(
                &self.credentials.account_sid,
                Some(&self.credentials.auth_token),
            )
            .form(&form)
            .send()
            .await
            .map_err(|e| provider_error(format!("Request to Twilio failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(provider_error(format!(
                "Twilio returned an error ({}): {}",
                status, error_body
            )));
        }

        match response.json::<MessageResponse>().await {
            Ok(message) => tracing::info!(sid = %message.sid, "SMS sent via Twilio"),
            Err(e) => tracing::warn!("SMS accepted but response could not be parsed: {}", e),
        }
        Ok(())
    }
}
