//! Fast2SMS delivery client.
//!
//! Implements the engine's [`SmsSender`] capability over the Fast2SMS
//! bulkV2 API. The provider's JSON response is passed through untouched.

use std::time::Duration;

use otp_engine::{SmsError, SmsSender};
use serde_json::json;

const FAST2SMS_URL: &str = "https://www.fast2sms.com/dev/bulkV2";

/// Fast2SMS API client
#[derive(Debug, Clone)]
pub struct Fast2SmsClient {
    http: reqwest::Client,
    api_key: String,
    sender_id: String,
    endpoint: String,
}

impl Fast2SmsClient {
    pub fn new(api_key: String, sender_id: String, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_key,
            sender_id,
            endpoint: FAST2SMS_URL.to_string(),
        })
    }

    #[cfg(test)]
    fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }
}

#[async_trait::async_trait]
impl SmsSender for Fast2SmsClient {
    async fn send(&self, phone: &str, message: &str) -> Result<serde_json::Value, SmsError> {
        // Fast2SMS expects numbers without the leading plus.
        let payload = json!({
            "route": "v3",
            "sender_id": self.sender_id,
            "message": message,
            "language": "english",
            "flash": 0,
            "numbers": phone.replace('+', ""),
        });

        let response = self
            .http
            .post(&self.endpoint)
            .header("authorization", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| SmsError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SmsError::Provider(format!("HTTP {status}: {body}")));
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| SmsError::Provider(format!("unparseable response: {e}")))
    }
}
