//! SMS delivery capability.
//!
//! The engine never talks to a provider directly; it holds an
//! `Arc<dyn SmsSender>` and treats the provider's response as an opaque
//! blob. The concrete client lives in the service binary.

use thiserror::Error;

/// Delivery failures, as seen from the engine.
#[derive(Debug, Error)]
pub enum SmsError {
    /// The provider answered with an error status. Detail is the provider's
    /// diagnostics, never the message body.
    #[error("provider rejected the message: {0}")]
    Provider(String),

    /// The request never completed (connect failure, broken transport).
    #[error("transport error: {0}")]
    Transport(String),
}

/// Capability to deliver a single SMS.
#[async_trait::async_trait]
pub trait SmsSender: Send + Sync {
    /// Send `message` to `phone`. On success the provider's response is
    /// returned verbatim for informational pass-through.
    async fn send(&self, phone: &str, message: &str) -> Result<serde_json::Value, SmsError>;
}
