//! Phone-key normalization.
//!
//! A string-level heuristic, not E.164 validation: trimmed, `+`-prefixed
//! values pass through, bare 10-digit values get the default country code.
//! Applied identically on the issue and verify paths so both always hit the
//! same key.

use crate::error::OtpError;

/// Normalize a raw phone string into the canonical phone key.
///
/// Idempotent: normalizing an already-normalized key is a no-op.
pub fn normalize(raw: &str, default_country_code: &str) -> Result<String, OtpError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(OtpError::InvalidRequest("phone must not be empty".into()));
    }

    if trimmed.starts_with('+') {
        return Ok(trimmed.to_string());
    }

    if trimmed.len() == 10 && trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Ok(format!("{default_country_code}{trimmed}"));
    }

    Ok(trimmed.to_string())
}
