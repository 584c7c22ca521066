use lumen_core::ports::SpanReporter;

/// Reporter for hosts without tracing; never finds a span.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSpanReporter;

impl SpanReporter for NoopSpanReporter {
    fn mark_failed(&self, _description: &str) -> bool {
        false
    }
}
