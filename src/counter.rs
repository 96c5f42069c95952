//! Request identifier generator.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::model::RequestId;

/// Monotonic, lock-free source of [`RequestId`]s. The first id issued is 1.
#[derive(Debug, Default)]
pub struct RequestCounter {
    last: AtomicU64,
}

impl RequestCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh identifier.
    pub fn next(&self) -> RequestId {
        RequestId(self.last.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Last identifier issued, or 0 if none.
    pub fn current(&self) -> u64 {
        self.last.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn starts_at_one() {
        let counter = RequestCounter::new();
        assert_eq!(counter.current(), 0);
        assert_eq!(counter.next(), RequestId(1));
        assert_eq!(counter.next(), RequestId(2));
        assert_eq!(counter.current(), 2);
    }

    #[test]
    fn concurrent_callers_never_collide() {
        let counter = Arc::new(RequestCounter::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counter = Arc::clone(&counter);
                std::thread::spawn(move || (0..1000).map(|_| counter.next()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 8000);
        assert_eq!(counter.current(), 8000);
    }
}
