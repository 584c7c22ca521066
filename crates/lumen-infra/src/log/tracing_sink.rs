//! `tracing`-backed log sink.

use lumen_core::domain::{FieldSet, FieldValue, LogLevel};
use lumen_core::ports::LogSink;

/// Target used for every request record, so filters can single them out
/// (`RUST_LOG=lumen::http=info`).
pub const TARGET: &str = "lumen::http";

/// Emits records as `tracing` events.
///
/// The whole field set travels as a JSON-rendered `fields` value; status,
/// method and path are repeated as first-class fields for filtering.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogSink;

impl TracingLogSink {
    pub fn new() -> Self {
        Self
    }
}

fn str_field<'a>(fields: &'a FieldSet, key: &str) -> &'a str {
    fields.get(key).and_then(FieldValue::as_str).unwrap_or_default()
}

impl LogSink for TracingLogSink {
    fn log(&self, level: LogLevel, message: &str, fields: &FieldSet) {
        let status = fields
            .get("http.response.status_code")
            .and_then(FieldValue::as_i64)
            .unwrap_or_default();
        let method = str_field(fields, "http.request.method");
        let path = str_field(fields, "url.path");

        match level {
            LogLevel::Info => {
                tracing::info!(target: TARGET, status, method, path, fields = %fields, "{}", message)
            }
            LogLevel::Error => {
                tracing::error!(target: TARGET, status, method, path, fields = %fields, "{}", message)
            }
        }
    }
}
