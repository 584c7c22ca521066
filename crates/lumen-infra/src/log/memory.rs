//! In-memory log sink - keeps every record for later inspection.

use std::sync::{Mutex, MutexGuard, PoisonError};

use lumen_core::domain::{FieldSet, LogLevel, LogRecord};
use lumen_core::ports::LogSink;

/// Sink that appends records to a vector instead of writing them anywhere.
///
/// Intended for tests and for hosts that want to inspect the last requests.
/// Note: the vector grows without bound; call [`take`](Self::take) to drain it.
#[derive(Debug, Default)]
pub struct InMemoryLogSink {
    records: Mutex<Vec<LogRecord>>,
}

impl InMemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogRecord>> {
        // A panic while holding the lock cannot leave a half-pushed record behind.
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of all records emitted so far.
    pub fn records(&self) -> Vec<LogRecord> {
        self.lock().clone()
    }

    /// Drain and return all records.
    pub fn take(&self) -> Vec<LogRecord> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl LogSink for InMemoryLogSink {
    fn log(&self, level: LogLevel, message: &str, fields: &FieldSet) {
        self.lock().push(LogRecord {
            level,
            message: message.to_string(),
            fields: fields.clone(),
        });
    }
}
