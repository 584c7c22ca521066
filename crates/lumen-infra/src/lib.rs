//! # Lumen Infrastructure
//!
//! Concrete implementations of the ports defined in `lumen-core`.
//!
//! ## Feature Flags
//!
//! - `otel` - validate spans against the OpenTelemetry context before marking them failed

pub mod log;
pub mod span;

pub use log::{InMemoryLogSink, TracingLogSink};
pub use span::{NoopSpanReporter, TracingSpanReporter};
