//! Password policy, hashing and verification
//!
//! Hashing uses bcrypt with a configurable cost. The policy is enforced
//! before a digest is ever produced; the strength score is advisory only
//! and never blocks an otherwise-valid password.

use crate::utils::error::{PortalError, Result};

/// Minimum password length accepted by the policy
pub const MIN_LENGTH: usize = 8;
/// Maximum password length accepted by the policy
pub const MAX_LENGTH: usize = 128;

/// Passwords rejected outright, compared case-insensitively
const BLACKLIST: &[&str] = &[
    "password",
    "password1",
    "password123",
    "12345678",
    "123456789",
    "qwerty123",
    "abc12345",
    "welcome1",
    "iloveyou",
    "admin123",
    "letmein1",
    "srilanka",
    "srilanka1",
    "colombo123",
    "government",
    "govportal",
    "citizen1",
];

/// Validate a password against the policy
///
/// Returns every violated rule as a field-level message.
pub fn validate_policy(password: &str) -> std::result::Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if password.len() < MIN_LENGTH {
        errors.push(format!("password: must be at least {} characters", MIN_LENGTH));
    }
    if password.len() > MAX_LENGTH {
        errors.push(format!("password: must be at most {} characters", MAX_LENGTH));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("password: must contain an uppercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("password: must contain a lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("password: must contain a digit".to_string());
    }
    if is_blacklisted(password) {
        errors.push("password: is too common".to_string());
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Hash a password, rejecting policy violations before producing a digest
pub fn hash_password(password: &str, cost: u32) -> Result<String> {
    validate_policy(password).map_err(PortalError::validation)?;

    bcrypt::hash(password, cost)
        .map_err(|e| PortalError::Crypto(format!("Failed to hash password: {}", e)))
}

/// Verify a password against its stored digest
///
/// Returns `Ok(false)` on mismatch; errors only on a malformed digest.
pub fn verify_password(password: &str, digest: &str) -> Result<bool> {
    bcrypt::verify(password, digest)
        .map_err(|e| PortalError::Crypto(format!("Failed to parse password hash: {}", e)))
}

/// Advisory strength score, 0 (weakest) to 4 (strongest)
///
/// Rewards length tiers and character-class diversity; penalizes
/// sequential runs, repeated characters and blacklist membership.
pub fn strength_score(password: &str) -> u8 {
    if is_blacklisted(password) {
        return 0;
    }

    let mut score: i32 = 0;

    if password.len() >= 8 {
        score += 1;
    }
    if password.len() >= 12 {
        score += 1;
    }
    if password.len() >= 16 {
        score += 1;
    }

    let classes = [
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_ascii_alphanumeric()),
    ]
    .iter()
    .filter(|&&present| present)
    .count();

    if classes >= 3 {
        score += 1;
    }
    if classes == 4 {
        score += 1;
    }

    if has_sequential_run(password, 4) {
        score -= 1;
    }
    if has_repeated_run(password, 3) {
        score -= 1;
    }

    score.clamp(0, 4) as u8
}

fn is_blacklisted(password: &str) -> bool {
    let lowered = password.to_lowercase();
    BLACKLIST.contains(&lowered.as_str())
}

/// True if the password contains `len` consecutive ascending characters
/// ("abcd", "1234")
fn has_sequential_run(password: &str, len: usize) -> bool {
    let bytes: Vec<u8> = password.bytes().collect();
    if bytes.len() < len {
        return false;
    }
    bytes
        .windows(len)
        .any(|w| w.windows(2).all(|p| p[1] == p[0].wrapping_add(1)))
}

/// True if any character repeats `len` times in a row
fn has_repeated_run(password: &str, len: usize) -> bool {
    let bytes: Vec<u8> = password.bytes().collect();
    if bytes.len() < len {
        return false;
    }
    bytes.windows(len).any(|w| w.iter().all(|&b| b == w[0]))
}
