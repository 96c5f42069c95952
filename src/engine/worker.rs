//! The worker loop: waits out each job's minimum delay, hashes it and
//! publishes the digest.

use std::sync::Arc;
use std::time::Duration;

use opentelemetry::KeyValue;
use secrecy::ExposeSecret;
use tokio::time::Instant;
use tracing::{Span, debug, error, info};

use crate::config::EngineConfig;
use crate::digest;
use crate::model::{Job, RequestId};
use crate::queue::WorkQueue;
use crate::store::ResultStore;
use crate::telemetry::job::{record_state_transition, start_job_span};
use crate::telemetry::metrics;

/// Roughly thirty years; what tokio itself uses for "never".
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Single consumer of the work queue.
pub struct Worker {
    queue: Arc<WorkQueue>,
    store: Arc<ResultStore>,
    config: EngineConfig,
}

impl Worker {
    pub fn new(queue: Arc<WorkQueue>, store: Arc<ResultStore>, config: EngineConfig) -> Self {
        Self {
            queue,
            store,
            config,
        }
    }

    /// Run until the queue is closed and empty.
    ///
    /// Jobs are taken strictly from the head. The head is always the oldest
    /// pending job, so once it is due nothing behind it can be due earlier.
    pub async fn run(self) {
        info!(
            min_delay_ms = saturating_millis(self.config.min_delay),
            idle_backoff_ms = saturating_millis(self.config.idle_backoff),
            "worker started"
        );

        // Span of the head job, opened the first time it is seen waiting and
        // closed once the job is published.
        let mut head_span: Option<(RequestId, Span)> = None;

        loop {
            let due = self
                .queue
                .peek(|job| (job.id, self.due_at(job.submitted_at)));

            match due {
                None => {
                    // Closed is checked first: nothing can be enqueued after
                    // close, so closed-then-empty is final.
                    if self.queue.is_closed() && self.queue.is_empty() {
                        break;
                    }
                    tokio::select! {
                        _ = self.queue.notified() => {}
                        _ = tokio::time::sleep(self.config.idle_backoff) => {}
                    }
                }
                Some((id, due_at)) if due_at > Instant::now() => {
                    if !matches!(head_span, Some((open, _)) if open == id) {
                        let span = start_job_span(id);
                        record_state_transition(&span, "queued", "waiting");
                        head_span = Some((id, span));
                    }
                    let remaining = due_at.saturating_duration_since(Instant::now());
                    debug!(
                        id = %id,
                        remaining_ms = saturating_millis(remaining),
                        "head job not due, sleeping"
                    );
                    tokio::time::sleep_until(due_at).await;
                }
                Some(_) => {
                    if let Some(job) = self.queue.dequeue() {
                        let span = match head_span.take() {
                            Some((open, span)) if open == job.id => {
                                record_state_transition(&span, "waiting", "processing");
                                span
                            }
                            _ => {
                                let span = start_job_span(job.id);
                                record_state_transition(&span, "queued", "processing");
                                span
                            }
                        };
                        self.process(job, &span);
                    }
                }
            }
        }

        info!("worker stopped, queue drained");
    }

    /// When a job submitted at `submitted_at` becomes due. A delay too large
    /// to represent pushes the job into the far future instead of panicking.
    fn due_at(&self, submitted_at: Instant) -> Instant {
        submitted_at
            .checked_add(self.config.min_delay)
            .unwrap_or_else(|| Instant::now() + FAR_FUTURE)
    }

    fn process(&self, job: Job, span: &Span) {
        let _enter = span.enter();

        let waited = job.submitted_at.elapsed();
        let (digest, elapsed) = digest::encode(job.payload.expose_secret());
        let micros = digest::saturating_micros(elapsed);

        match self.store.put(job.id, digest, elapsed) {
            Ok(()) => {
                record_state_transition(span, "processing", "completed");
                metrics::jobs_completed().add(1, &[]);
                metrics::digest_duration_us().record(micros, &[]);
                metrics::queue_wait_ms()
                    .record(waited.as_secs_f64() * 1000.0, &[KeyValue::new("outcome", "ok")]);
                info!(id = %job.id, compute_us = micros, "digest published");
            }
            Err(e) => {
                // Log and skip: the worker must keep serving the rest of the queue.
                record_state_transition(span, "processing", "dropped");
                error!(id = %job.id, error = %e, "result store rejected digest, job dropped");
            }
        }
    }
}

fn saturating_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
