//! # Daily Code
//!
//! Deterministic, date-scoped six-digit identity proof. A user shows the
//! code at a physical handoff; the system recomputes it independently, so no
//! server round trip or stored secret is involved. The code is stable for
//! one calendar day and rotates at the date boundary.

use chrono::NaiveDate;
use sha2::{Digest, Sha256};

use super::errors::FulfillmentError;
use super::value_objects::UserId;

/// Number of digits in a daily code.
pub const CODE_LEN: usize = 6;

const CODE_SPACE: u64 = 1_000_000;

/// Derive the code for a user on a calendar date.
///
/// Pure function: same inputs always yield the same six-digit string.
/// The derivation hashes the user identifier together with the ISO-8601
/// date (time of day never participates).
pub fn code(user: UserId, date: NaiveDate) -> String {
    let mut hasher = Sha256::new();
    hasher.update(user.0.as_bytes());
    hasher.update(date.format("%Y-%m-%d").to_string().as_bytes());
    let digest = hasher.finalize();

    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    let value = u64::from_be_bytes(prefix) % CODE_SPACE;

    format!("{value:06}")
}

/// Strip everything but ASCII digits from a submitted code.
pub fn normalize(submitted: &str) -> String {
    submitted.chars().filter(char::is_ascii_digit).collect()
}

/// Render a code for display: separator after the third digit (`123-456`).
pub fn format_code(raw: &str) -> String {
    let digits = normalize(raw);
    if digits.len() <= 3 {
        return digits;
    }
    format!("{}-{}", &digits[..3], &digits[3..])
}

/// Check a submitted code against the derived value for that user and date.
pub fn is_valid(user: UserId, submitted: &str, date: NaiveDate) -> bool {
    normalize(submitted) == code(user, date)
}

/// Validate a submitted code, failing with `InvalidCode` on mismatch.
pub fn verify(user: UserId, submitted: &str, date: NaiveDate) -> Result<(), FulfillmentError> {
    if is_valid(user, submitted, date) {
        return Ok(());
    }
    Err(FulfillmentError::InvalidCode)
}
