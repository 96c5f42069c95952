//! Pending-job FIFO.
//!
//! Every operation goes through the same mutex, so the queue stays ordered
//! no matter how many producers or consumers touch it. Producers never wait
//! on consumers: `enqueue` only holds the lock long enough to push.
//!
//! Consumers can await [`WorkQueue::notified`] instead of polling; it fires
//! on every enqueue and on close.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::Notify;

use crate::error::{Error, Result};
use crate::model::{Job, RequestId};

#[derive(Debug, Default)]
struct Inner {
    jobs: VecDeque<Job>,
    closed: bool,
}

#[derive(Debug, Default)]
pub struct WorkQueue {
    inner: Mutex<Inner>,
    wake: Notify,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave `Inner` half-updated
    // (push/pop are single calls), so a poisoned guard is still usable.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append a job at the tail. Fails only after [`close`](Self::close).
    pub fn enqueue(&self, job: Job) -> Result<()> {
        self.enqueue_with(|| job).map(|_| ())
    }

    /// Build and append a job while holding the lock.
    ///
    /// `make` runs only if the queue is still open, so whatever it consumes
    /// (an identifier, say) is not wasted on a rejected submission, and jobs
    /// built this way sit in the queue in the order `make` was called.
    pub fn enqueue_with(&self, make: impl FnOnce() -> Job) -> Result<RequestId> {
        let id = {
            let mut inner = self.lock();
            if inner.closed {
                return Err(Error::ShuttingDown);
            }
            let job = make();
            let id = job.id;
            inner.jobs.push_back(job);
            id
        };
        self.wake.notify_one();
        Ok(id)
    }

    /// Remove and return the head, or `None` when empty. Never blocks.
    pub fn dequeue(&self) -> Option<Job> {
        self.lock().jobs.pop_front()
    }

    /// Inspect the head without removing it.
    pub fn peek<R>(&self, f: impl FnOnce(&Job) -> R) -> Option<R> {
        self.lock().jobs.front().map(f)
    }

    pub fn len(&self) -> usize {
        self.lock().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().jobs.is_empty()
    }

    /// Stop admitting jobs. Already-queued jobs stay and are still served.
    pub fn close(&self) {
        self.lock().closed = true;
        self.wake.notify_waiters();
        self.wake.notify_one();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Resolves after the next enqueue or close. A notification sent while
    /// nobody is waiting is kept for the next waiter.
    pub async fn notified(&self) {
        self.wake.notified().await
    }
}
