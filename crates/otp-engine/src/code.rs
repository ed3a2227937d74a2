//! OTP code generation and hashing.
//!
//! Codes are uniform over the full numeric range for their length and are
//! stored only as SHA-256(salt || code). Comparison is constant-time.

use rand::Rng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Bytes of per-record salt.
pub const SALT_LEN: usize = 16;

/// Longest supported code: 10^19 still fits in a u64.
pub const MAX_CODE_LENGTH: u32 = 19;

/// Generate a uniformly random numeric code of `length` digits, zero-padded.
///
/// # Panics
/// If `length` is 0 or exceeds [`MAX_CODE_LENGTH`].
pub fn generate_code(length: u32) -> String {
    assert!(
        (1..=MAX_CODE_LENGTH).contains(&length),
        "code length must be 1..={MAX_CODE_LENGTH}, got {length}"
    );
    let upper = 10u64.pow(length);
    let value = rand::rng().random_range(0..upper);
    format!("{:0width$}", value, width = length as usize)
}

/// Generate a fresh random salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill(&mut salt);
    salt
}

/// SHA-256(salt || code).
pub fn hash_code(salt: &[u8], code: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(code.as_bytes());
    hasher.finalize().into()
}

/// Constant-time digest comparison, to avoid timing side-channels on verify.
pub fn digests_match(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a[..].ct_eq(&b[..]).into()
}
