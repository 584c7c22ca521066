//! Log sink implementations - `tracing` output and an in-memory recorder.

mod memory;
mod tracing_sink;

pub use memory::InMemoryLogSink;
pub use tracing_sink::TracingLogSink;
