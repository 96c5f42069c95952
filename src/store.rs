//! Completed digests and the aggregate statistics derived from them.
//!
//! Both live behind one `RwLock`: a digest becomes visible in the same
//! critical section that counts it, so readers never see an entry the
//! statistics do not include (or the reverse).

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::model::{RequestId, StatsSnapshot};

/// Running totals over completed jobs.
#[derive(Debug, Default, Clone, Copy)]
pub struct Statistics {
    total_processed: u64,
    total_compute_micros: u64,
}

impl Statistics {
    /// Account for one completed job.
    pub fn record(&mut self, duration_micros: u64) {
        self.total_processed += 1;
        self.total_compute_micros += duration_micros;
    }

    /// `(count, average)`; both zero before the first job completes.
    pub fn snapshot(&self) -> StatsSnapshot {
        let average_micros = self
            .total_compute_micros
            .checked_div(self.total_processed)
            .unwrap_or(0);
        StatsSnapshot {
            count: self.total_processed,
            average_micros,
        }
    }
}

#[derive(Debug, Default)]
struct Ledger {
    digests: HashMap<RequestId, String>,
    stats: Statistics,
}

/// Write-once map of request id to digest, plus statistics.
#[derive(Debug, Default)]
pub struct ResultStore {
    ledger: RwLock<Ledger>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Ledger> {
        self.ledger.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Ledger> {
        self.ledger.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Publish a digest and record its compute time.
    ///
    /// A second `put` for the same id is rejected and the first entry and
    /// the statistics are left as they were.
    pub fn put(&self, id: RequestId, digest: String, elapsed: Duration) -> Result<()> {
        let micros = crate::digest::saturating_micros(elapsed);
        let mut ledger = self.write();
        if ledger.digests.contains_key(&id) {
            return Err(Error::DuplicateResult(id));
        }
        ledger.digests.insert(id, digest);
        ledger.stats.record(micros);
        Ok(())
    }

    /// Digest for `id`, or `None` if it is unknown or still pending.
    pub fn get(&self, id: RequestId) -> Option<String> {
        self.read().digests.get(&id).cloned()
    }

    pub fn count(&self) -> usize {
        self.read().digests.len()
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.read().stats.snapshot()
    }
}
