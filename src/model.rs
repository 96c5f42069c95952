//! Core data model.
//!
//! A job is one password waiting to be hashed. It carries the identifier
//! handed back to the submitter and the instant it was accepted, which the
//! worker uses to enforce the minimum delay.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tokio::time::Instant;

// ---------------------------------------------------------------------------
// Request identifier
// ---------------------------------------------------------------------------

/// Identifier returned to a submitter. Issued by [`crate::counter::RequestCounter`],
/// never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RequestId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// A queued unit of work. Immutable once created.
#[derive(Debug)]
pub struct Job {
    pub id: RequestId,

    /// The password. Wrapped so it never shows up in `Debug` output or logs.
    pub payload: SecretString,

    /// When the job was accepted. Monotonic, so wall-clock jumps cannot
    /// shorten or stretch the delay.
    pub submitted_at: Instant,
}

impl Job {
    pub fn new(id: RequestId, payload: impl Into<String>) -> Self {
        Self {
            id,
            payload: SecretString::from(payload.into()),
            submitted_at: Instant::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Point-in-time view of the aggregate statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Number of jobs whose digest has been published.
    pub count: u64,
    /// Mean digest computation time in microseconds (integer division).
    /// Zero when `count` is zero.
    pub average_micros: u64,
}

impl StatsSnapshot {
    /// True when no job has completed yet.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
