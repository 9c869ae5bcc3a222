use tracing::{Level, Span, field};

use super::TraceId;

/// Root span for one draw. `participant_id` is recorded once a winner is known.
pub fn draw_span(trace_id: &TraceId, epoch: u64) -> Span {
    tracing::span!(
        Level::INFO,
        "draw",
        trace_id = %trace_id,
        epoch,
        participant_id = field::Empty
    )
}

/// Child span, inherits the trace id of whatever span is current.
pub fn child_span(name: &'static str) -> Span {
    tracing::span!(Level::INFO, "child", name = name)
}
