//! # OTP Engine
//!
//! The OTP lifecycle engine behind smsgate: code issuance, salted-hash
//! storage with expiry, per-phone rate limiting, and constant-time
//! verification.
//!
//! ## Modules
//! - `store` - Per-phone OTP records (issue / verify / revoke)
//! - `limiter` - Rolling-window rate limiter (cooldown + quota)
//! - `service` - Request orchestration over an abstract SMS sender
//! - `phone` - Phone-key normalization
//! - `sweep` - Background eviction of expired state

pub mod clock;
pub mod code;
pub mod error;
pub mod limiter;
pub mod phone;
pub mod sender;
pub mod service;
mod shard;
pub mod store;
pub mod sweep;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::OtpError;
pub use limiter::{Decision, DenyReason, RateLimiter};
pub use sender::{SmsError, SmsSender};
pub use service::{OtpService, SendReceipt, ServiceConfig};
pub use store::{OtpStore, VerifyOutcome};
