//! Span reporters - mark the current request span as failed.

mod noop;
mod tracing_span;

pub use noop::NoopSpanReporter;
pub use tracing_span::TracingSpanReporter;
