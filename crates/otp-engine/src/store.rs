//! Per-phone OTP records with expiry.
//!
//! One live record per phone key: issuing again overwrites, a successful
//! verify consumes, a failed send revokes. Plaintext codes are never
//! retained; records hold only a salted SHA-256 digest.

use std::sync::Arc;

use crate::clock::Clock;
use crate::code::{self, SALT_LEN};
use crate::shard::ShardedMap;

/// Outcome of a verification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Match; the record has been consumed.
    Valid,
    /// A live record exists but the candidate does not match. The record is
    /// retained so the user may retry within the TTL.
    Invalid,
    /// No record, or the record had expired.
    NotFound,
}

struct OtpRecord {
    salt: [u8; SALT_LEN],
    code_hash: [u8; 32],
    issued_at: i64,
}

/// Store of live OTP records keyed by normalized phone.
pub struct OtpStore {
    records: ShardedMap<OtpRecord>,
    ttl_secs: i64,
    code_length: u32,
    clock: Arc<dyn Clock>,
}

impl OtpStore {
    pub fn new(ttl_secs: u64, code_length: u32, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: ShardedMap::new(),
            ttl_secs: ttl_secs as i64,
            code_length,
            clock,
        }
    }

    /// Generate a fresh code for `phone`, replacing any prior record, and
    /// return the plaintext for one-time transmission.
    pub async fn issue(&self, phone: &str) -> String {
        let code = code::generate_code(self.code_length);
        let salt = code::generate_salt();
        let record = OtpRecord {
            salt,
            code_hash: code::hash_code(&salt, &code),
            issued_at: self.clock.now_unix(),
        };

        let mut shard = self.records.lock(phone).await;
        shard.insert(phone.to_string(), record);

        tracing::debug!(phone = %redact(phone), "OTP issued");
        code
    }

    /// Compare `candidate` against the live record for `phone`.
    ///
    /// Expired records are treated exactly like missing ones (and removed on
    /// sight). A match consumes the record atomically; a mismatch leaves it.
    pub async fn verify(&self, phone: &str, candidate: &str) -> VerifyOutcome {
        let now = self.clock.now_unix();
        let mut shard = self.records.lock(phone).await;

        let Some(record) = shard.get(phone) else {
            return VerifyOutcome::NotFound;
        };

        if now - record.issued_at >= self.ttl_secs {
            shard.remove(phone);
            tracing::debug!(phone = %redact(phone), "expired OTP evicted on verify");
            return VerifyOutcome::NotFound;
        }

        let candidate_hash = code::hash_code(&record.salt, candidate);
        if code::digests_match(&record.code_hash, &candidate_hash) {
            shard.remove(phone);
            tracing::info!(phone = %redact(phone), "OTP verified");
            VerifyOutcome::Valid
        } else {
            tracing::debug!(phone = %redact(phone), "OTP mismatch");
            VerifyOutcome::Invalid
        }
    }

    /// Delete the record unconditionally (rollback after a failed send).
    pub async fn revoke(&self, phone: &str) {
        let mut shard = self.records.lock(phone).await;
        if shard.remove(phone).is_some() {
            tracing::debug!(phone = %redact(phone), "OTP revoked");
        }
    }

    /// Evict expired records. Housekeeping only; `verify` checks staleness
    /// itself and never trusts the sweep.
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now_unix();
        let ttl = self.ttl_secs;
        let mut removed = 0;
        self.records
            .for_each_shard(|shard| {
                let before = shard.len();
                shard.retain(|_, r| now - r.issued_at < ttl);
                removed += before - shard.len();
            })
            .await;
        removed
    }
}

/// Keep the country code and last two digits, mask the rest.
pub(crate) fn redact(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    if chars.len() <= 5 {
        return "***".to_string();
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{head}***{tail}")
}
