//! Metric instrument factories for hashq.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! Without an OTLP endpoint the global provider is a no-op, so recording is
//! always safe.

use opentelemetry::metrics::{Counter, Histogram, Meter};

fn meter() -> Meter {
    opentelemetry::global::meter("hashq")
}

/// Counter: submissions seen at the service boundary.
/// Labels: `result` ("ok" | "invalid" | "rejected").
pub fn jobs_submitted() -> Counter<u64> {
    meter()
        .u64_counter("hashq.jobs.submitted")
        .with_description("Number of hash submissions")
        .build()
}

/// Counter: jobs whose digest was published.
pub fn jobs_completed() -> Counter<u64> {
    meter()
        .u64_counter("hashq.jobs.completed")
        .with_description("Number of digests published")
        .build()
}

/// Histogram: digest computation time.
pub fn digest_duration_us() -> Histogram<u64> {
    meter()
        .u64_histogram("hashq.digest.duration_us")
        .with_description("SHA-512 digest computation time")
        .with_unit("us")
        .build()
}

/// Histogram: time a job spent queued before processing started.
pub fn queue_wait_ms() -> Histogram<f64> {
    meter()
        .f64_histogram("hashq.queue.wait_ms")
        .with_description("Time from submission to processing")
        .with_unit("ms")
        .build()
}
