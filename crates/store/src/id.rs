//! Notification identifier generation.
//!
//! An id is a random UUID v4 followed by a short SHA-256 fingerprint of the payload:
//! `3f2b…-9c1e5d0a7b`. The UUID makes every id unique, even for identical payloads.
//! The fingerprint only lets an operator spot notifications that share content; it is
//! not used for deduplication.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Number of hex characters of the payload digest kept in an id.
pub const FINGERPRINT_LEN: usize = 10;

/// Short hex fingerprint of a payload.
pub fn fingerprint(payload: &str) -> String {
    let digest = Sha256::digest(payload.as_bytes());
    let mut hex = hex::encode(digest);
    hex.truncate(FINGERPRINT_LEN);
    hex
}

/// Generate a fresh notification id for `payload`.
pub fn generate_id(payload: &str) -> String {
    format!("{}-{}", Uuid::new_v4(), fingerprint(payload))
}
