//! Core engine: the service handle shared by the HTTP boundary and the
//! background worker.
//!
//! A [`HashService`] is built once at startup. Cloning it is cheap and every
//! clone talks to the same queue, store and counter.

pub mod worker;

pub use worker::Worker;

use std::sync::Arc;

use opentelemetry::KeyValue;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::counter::RequestCounter;
use crate::error::{Error, Result};
use crate::model::{Job, RequestId, StatsSnapshot};
use crate::queue::WorkQueue;
use crate::store::ResultStore;
use crate::telemetry::metrics;

/// Handle to the deferred hashing pipeline.
pub struct HashService {
    queue: Arc<WorkQueue>,
    store: Arc<ResultStore>,
    counter: Arc<RequestCounter>,
    config: EngineConfig,
    worker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Clone for HashService {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
            store: Arc::clone(&self.store),
            counter: Arc::clone(&self.counter),
            config: self.config,
            worker: Arc::clone(&self.worker),
        }
    }
}

impl HashService {
    /// Build the pipeline and spawn its worker on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn start(config: EngineConfig) -> Self {
        let queue = Arc::new(WorkQueue::new());
        let store = Arc::new(ResultStore::new());

        let worker = Worker::new(Arc::clone(&queue), Arc::clone(&store), config);
        let handle = tokio::spawn(worker.run());

        Self {
            queue,
            store,
            counter: Arc::new(RequestCounter::new()),
            config,
            worker: Arc::new(Mutex::new(Some(handle))),
        }
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Accept a password for deferred hashing and return its identifier
    /// immediately.
    ///
    /// Empty payloads and submissions after [`drain_and_stop`](Self::drain_and_stop)
    /// has begun are rejected without consuming an identifier.
    pub fn submit(&self, payload: &str) -> Result<RequestId> {
        if payload.is_empty() {
            metrics::jobs_submitted().add(1, &[KeyValue::new("result", "invalid")]);
            return Err(Error::InvalidInput(
                "'password' parameter is required.".to_string(),
            ));
        }

        let counter = &self.counter;
        match self
            .queue
            .enqueue_with(|| Job::new(counter.next(), payload))
        {
            Ok(id) => {
                metrics::jobs_submitted().add(1, &[KeyValue::new("result", "ok")]);
                info!(id = %id, pending = self.queue.len(), "job queued");
                Ok(id)
            }
            Err(e) => {
                metrics::jobs_submitted().add(1, &[KeyValue::new("result", "rejected")]);
                warn!("submission rejected: {e}");
                Err(e)
            }
        }
    }

    /// Digest for `id`. `NotFound` covers both unknown and still-pending ids.
    pub fn lookup(&self, id: RequestId) -> Result<String> {
        self.store
            .get(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Like [`lookup`](Self::lookup) for a textual id. Ids that do not parse
    /// can never have been issued, so they are `NotFound` as well.
    pub fn lookup_str(&self, raw: &str) -> Result<String> {
        match raw.parse::<RequestId>() {
            Ok(id) => self.lookup(id),
            Err(_) => Err(Error::NotFound(raw.to_string())),
        }
    }

    /// Completed-job count and mean compute time. Zero before the first
    /// job completes.
    pub fn stats(&self) -> StatsSnapshot {
        self.store.snapshot()
    }

    /// Jobs accepted but not yet hashed.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Last identifier handed out.
    pub fn last_issued(&self) -> u64 {
        self.counter.current()
    }

    /// Stop accepting work and wait until every pending job is published.
    ///
    /// Safe to call more than once and from several tasks; every caller
    /// returns once the worker has exited.
    pub async fn drain_and_stop(&self) -> Result<()> {
        self.queue.close();
        info!(pending = self.queue.len(), "draining work queue");

        let mut worker = self.worker.lock().await;
        if let Some(handle) = worker.take() {
            handle
                .await
                .map_err(|e| Error::Other(format!("worker task failed: {e}")))?;
        }

        info!(completed = self.store.count(), "work queue drained");
        Ok(())
    }
}
