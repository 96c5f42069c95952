//! Job processing span helpers.

use tracing::Span;

use crate::model::RequestId;

/// Start a span covering one job from dequeue to publish.
///
/// `job.state` is declared empty and updated by [`record_state_transition`].
pub fn start_job_span(id: RequestId) -> Span {
    tracing::info_span!(
        "job.process",
        "job.id" = id.0,
        "job.state" = tracing::field::Empty,
    )
}

/// Record a state transition on the job span.
pub fn record_state_transition(span: &Span, from: &str, to: &str) {
    span.record("job.state", to);
    span.in_scope(|| {
        tracing::debug!(from = from, to = to, "state_transition");
    });
}
