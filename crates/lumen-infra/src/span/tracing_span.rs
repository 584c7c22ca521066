//! Marks the current `tracing` span as failed.
//!
//! The span is expected to be the per-request root span created by
//! `tracing_actix_web::TracingLogger`. Its default root span declares
//! `otel.status_code` only; `otel.status_message` is recorded when the host's
//! root span builder declares it too. `tracing-opentelemetry` maps both onto
//! the exported span status.

use lumen_core::ports::SpanReporter;
use tracing::Span;

/// Reporter working on [`Span::current`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSpanReporter;

impl TracingSpanReporter {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "otel")]
fn is_valid(span: &Span) -> bool {
    use opentelemetry::trace::TraceContextExt;
    use tracing_opentelemetry::OpenTelemetrySpanExt;

    span.context().span().span_context().is_valid()
}

#[cfg(not(feature = "otel"))]
fn is_valid(span: &Span) -> bool {
    !span.is_disabled()
}

impl SpanReporter for TracingSpanReporter {
    fn mark_failed(&self, description: &str) -> bool {
        let span = Span::current();
        if span.is_none() || !is_valid(&span) {
            return false;
        }

        span.record("otel.status_code", "ERROR");
        span.record("otel.status_message", description);
        tracing::debug!(description, "request span marked as failed");
        true
    }
}

#[cfg(all(test, not(feature = "otel")))]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing::field::Empty;
    use tracing_subscriber::fmt::format::FmtSpan;

    #[test]
    fn test_no_span_is_tolerated() {
        assert!(!TracingSpanReporter.mark_failed("panic occurred"));
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_marks_entered_span() {
        let out = Captured::default();
        let writer = out.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let span = tracing::info_span!(
                "HTTP request",
                otel.status_code = Empty,
                otel.status_message = Empty
            );
            let _guard = span.enter();
            assert!(TracingSpanReporter.mark_failed("panic occurred"));
        });

        let output = String::from_utf8(out.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("otel.status_code=\"ERROR\""), "{output}");
        assert!(output.contains("otel.status_message=\"panic occurred\""), "{output}");
    }
}
