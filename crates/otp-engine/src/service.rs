//! Request orchestration.
//!
//! Ties the limiter, store, and send capability together:
//! rate check → issue → send (bounded) → rollback on failure. The service
//! itself holds no per-request state; everything per-phone lives in the two
//! stores it was constructed with.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::error::OtpError;
use crate::limiter::{Decision, RateLimiter};
use crate::phone;
use crate::sender::SmsSender;
use crate::store::{redact, OtpStore, VerifyOutcome};

/// Successful issuance result.
#[derive(Debug, Clone, Serialize)]
pub struct SendReceipt {
    /// The provider's response, passed through verbatim. Informational
    /// only; nothing in the engine depends on its shape.
    pub provider_response: serde_json::Value,
}

/// Tunables the service needs beyond its collaborators.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Country code prepended to bare 10-digit numbers.
    pub default_country_code: String,
    /// SMS body template; `{code}` is replaced with the plaintext OTP.
    pub message_template: String,
    /// Upper bound on the provider round-trip.
    pub send_timeout: Duration,
}

/// The OTP request handler.
pub struct OtpService {
    store: Arc<OtpStore>,
    limiter: Arc<RateLimiter>,
    sender: Arc<dyn SmsSender>,
    config: ServiceConfig,
}

impl OtpService {
    pub fn new(
        store: Arc<OtpStore>,
        limiter: Arc<RateLimiter>,
        sender: Arc<dyn SmsSender>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            store,
            limiter,
            sender,
            config,
        }
    }

    /// Issue and deliver a fresh OTP for `raw_phone`.
    ///
    /// A rate-limit denial returns before any code is generated. A send
    /// failure (including timeout) revokes the freshly stored record before
    /// surfacing the error: a code the user never received must not stay
    /// verifiable.
    pub async fn request_code(&self, raw_phone: &str) -> Result<SendReceipt, OtpError> {
        let phone = phone::normalize(raw_phone, &self.config.default_country_code)?;

        if let Decision::Denied(reason) = self.limiter.try_acquire(&phone).await {
            tracing::info!(phone = %redact(&phone), %reason, "OTP request rate limited");
            return Err(OtpError::RateLimited(reason));
        }

        let code = self.store.issue(&phone).await;
        let message = self.config.message_template.replace("{code}", &code);

        let sent =
            tokio::time::timeout(self.config.send_timeout, self.sender.send(&phone, &message))
                .await;

        match sent {
            Ok(Ok(provider_response)) => {
                tracing::info!(phone = %redact(&phone), "OTP sent");
                Ok(SendReceipt { provider_response })
            }
            Ok(Err(err)) => {
                self.store.revoke(&phone).await;
                tracing::warn!(phone = %redact(&phone), error = %err, "send failed, OTP rolled back");
                Err(OtpError::Provider(err.to_string()))
            }
            Err(_) => {
                self.store.revoke(&phone).await;
                tracing::warn!(
                    phone = %redact(&phone),
                    timeout_secs = self.config.send_timeout.as_secs(),
                    "send timed out, OTP rolled back"
                );
                Err(OtpError::Provider(format!(
                    "send timed out after {}s",
                    self.config.send_timeout.as_secs()
                )))
            }
        }
    }

    /// Verify a candidate code for `raw_phone`.
    ///
    /// Verification is deliberately not rate limited (reference behavior;
    /// see DESIGN.md).
    pub async fn check_code(&self, raw_phone: &str, candidate: &str) -> Result<(), OtpError> {
        let phone = phone::normalize(raw_phone, &self.config.default_country_code)?;
        let candidate = candidate.trim();
        if candidate.is_empty() {
            return Err(OtpError::InvalidRequest("code must not be empty".into()));
        }

        match self.store.verify(&phone, candidate).await {
            VerifyOutcome::Valid => Ok(()),
            VerifyOutcome::Invalid => Err(OtpError::WrongCode),
            VerifyOutcome::NotFound => Err(OtpError::NoActiveCode),
        }
    }
}
