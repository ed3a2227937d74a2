//! Error taxonomy for the OTP engine.

use thiserror::Error;

use crate::limiter::DenyReason;

/// Errors surfaced by the OTP engine.
///
/// Every variant maps to a fixed HTTP status; nothing internal leaks past
/// this taxonomy.
#[derive(Debug, Error)]
pub enum OtpError {
    /// Missing or malformed request input. Never touches the stores.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Issuance denied by the rate limiter.
    #[error("{0}")]
    RateLimited(DenyReason),

    /// The SMS provider (or its transport) failed; the issued OTP has
    /// already been rolled back when this is returned.
    #[error("SMS provider error: {0}")]
    Provider(String),

    /// No live OTP for this phone (never issued, consumed, or expired).
    #[error("no OTP requested or OTP expired")]
    NoActiveCode,

    /// A live OTP exists but the candidate does not match.
    #[error("invalid OTP")]
    WrongCode,

    /// Unexpected internal failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl OtpError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest(_) => 400,
            Self::RateLimited(_) => 429,
            Self::Provider(_) => 502,
            Self::NoActiveCode => 400,
            Self::WrongCode => 400,
            Self::Internal(_) => 500,
        }
    }
}
