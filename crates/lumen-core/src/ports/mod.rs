//! Ports - trait definitions for the logging and tracing collaborators.
//! Infrastructure crates provide the implementations.

mod log_sink;
mod span;

pub use log_sink::LogSink;
pub use span::SpanReporter;
