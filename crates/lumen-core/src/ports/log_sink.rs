use crate::domain::{FieldSet, LogLevel};

/// Destination for structured request log records.
///
/// Shared by every in-flight request, so implementations must tolerate
/// concurrent calls.
pub trait LogSink: Send + Sync {
    /// Emit one record. Sinks do not report failures back to the caller.
    fn log(&self, level: LogLevel, message: &str, fields: &FieldSet);

    fn info(&self, message: &str, fields: &FieldSet) {
        self.log(LogLevel::Info, message, fields);
    }

    fn error(&self, message: &str, fields: &FieldSet) {
        self.log(LogLevel::Error, message, fields);
    }
}
