//! Application state and shared resources.

use std::sync::Arc;
use std::time::Duration;

use otp_engine::{OtpService, OtpStore, RateLimiter, ServiceConfig, SmsSender, SystemClock};

use crate::config::AppConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// OTP record store (shared with the sweeper)
    pub store: Arc<OtpStore>,

    /// Per-phone rate limiter (shared with the sweeper)
    pub limiter: Arc<RateLimiter>,

    /// Request orchestration service
    pub service: Arc<OtpService>,
}

impl AppState {
    /// Wire the engine components around the given send capability.
    pub fn new(config: AppConfig, sender: Arc<dyn SmsSender>) -> Self {
        let clock = Arc::new(SystemClock);

        let store = Arc::new(OtpStore::new(
            config.otp_ttl_secs,
            config.code_length,
            clock.clone(),
        ));
        let limiter = Arc::new(RateLimiter::new(
            config.rate_limit.window_secs,
            config.rate_limit.min_gap_secs,
            config.rate_limit.max_per_window,
            clock,
        ));
        let service = Arc::new(OtpService::new(
            store.clone(),
            limiter.clone(),
            sender,
            ServiceConfig {
                default_country_code: config.default_country_code.clone(),
                message_template: config.message_template.clone(),
                send_timeout: Duration::from_secs(config.send_timeout_secs),
            },
        ));

        Self {
            config,
            store,
            limiter,
            service,
        }
    }
}
