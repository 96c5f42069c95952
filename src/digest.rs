//! Password digest: SHA-512, standard padded base64.
//!
//! Unsalted and deterministic on purpose: the same password always yields
//! the same digest.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha512};
use std::time::{Duration, Instant};

/// Hash `payload` and return the encoded digest together with the time the
/// computation itself took.
pub fn encode(payload: &str) -> (String, Duration) {
    let start = Instant::now();
    let hash = Sha512::digest(payload.as_bytes());
    let encoded = STANDARD.encode(hash);
    (encoded, start.elapsed())
}

/// `d` in whole microseconds, saturating at `u64::MAX`.
pub fn saturating_micros(d: Duration) -> u64 {
    u64::try_from(d.as_micros()).unwrap_or(u64::MAX)
}
