//! Configuration management for smsgate.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Fast2SMS API credential. Required; startup fails without it.
    #[serde(default)]
    pub api_key: String,

    /// Sender identifier shown to recipients
    #[serde(default = "default_sender_id")]
    pub sender_id: String,

    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// OTP validity in seconds
    #[serde(default = "default_otp_ttl")]
    pub otp_ttl_secs: u64,

    /// Digits per OTP code
    #[serde(default = "default_code_length")]
    pub code_length: u32,

    /// Country code prepended to bare 10-digit numbers
    #[serde(default = "default_country_code")]
    pub default_country_code: String,

    /// SMS body; `{code}` is replaced with the plaintext OTP
    #[serde(default = "default_message_template")]
    pub message_template: String,

    /// Upper bound on the provider round-trip in seconds
    #[serde(default = "default_send_timeout")]
    pub send_timeout_secs: u64,

    /// How often the background sweeper runs, in seconds
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Rolling window length in seconds
    #[serde(default = "default_window")]
    pub window_secs: u64,

    /// Minimum gap between two issuances for the same phone
    #[serde(default = "default_min_gap")]
    pub min_gap_secs: u64,

    /// Maximum issuances per phone inside the window
    #[serde(default = "default_max_per_window")]
    pub max_per_window: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window(),
            min_gap_secs: default_min_gap(),
            max_per_window: default_max_per_window(),
        }
    }
}

// Default value functions
fn default_sender_id() -> String { "FSTSMS".to_string() }
fn default_listen_addr() -> String { "0.0.0.0:8080".to_string() }
fn default_otp_ttl() -> u64 { 300 } // 5 minutes
fn default_code_length() -> u32 { 6 }
fn default_country_code() -> String { "+91".to_string() }
fn default_message_template() -> String {
    "Your OTP is {code}. It will expire in 5 minutes.".to_string()
}
fn default_send_timeout() -> u64 { 15 }
fn default_sweep_interval() -> u64 { 60 }
fn default_window() -> u64 { 3600 } // 1 hour
fn default_min_gap() -> u64 { 30 }
fn default_max_per_window() -> usize { 5 }

impl AppConfig {
    /// Load configuration from file and environment, with CLI overrides.
    pub fn load(config_path: &str, args: &super::Args) -> Result<Self> {
        let mut builder = config::Config::builder();

        if Path::new(config_path).exists() {
            builder = builder.add_source(config::File::with_name(config_path));
        } else {
            tracing::warn!("Config file not found, using defaults");
        }

        // SMSGATE_API_KEY, SMSGATE_LISTEN_ADDR, ... override the file.
        builder = builder.add_source(config::Environment::with_prefix("SMSGATE"));

        let mut config: Self = builder
            .build()
            .context("Failed to load config")?
            .try_deserialize()
            .context("Failed to parse config")?;

        // Apply CLI overrides
        if let Some(ref api_key) = args.api_key {
            config.api_key = api_key.clone();
        }
        if let Some(ref listen) = args.listen {
            config.listen_addr = listen.clone();
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            bail!("SMS API key is required (set SMSGATE_API_KEY or FAST2SMS_API_KEY)");
        }
        if !self.message_template.contains("{code}") {
            bail!("message_template must contain the {{code}} placeholder");
        }
        if self.code_length == 0 || self.code_length > 9 {
            bail!("code_length must be between 1 and 9 digits");
        }
        if self.rate_limit.max_per_window == 0 {
            bail!("rate_limit.max_per_window must be at least 1");
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            sender_id: default_sender_id(),
            listen_addr: default_listen_addr(),
            otp_ttl_secs: default_otp_ttl(),
            code_length: default_code_length(),
            default_country_code: default_country_code(),
            message_template: default_message_template(),
            send_timeout_secs: default_send_timeout(),
            sweep_interval_secs: default_sweep_interval(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}
