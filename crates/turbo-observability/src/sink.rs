//! Log destinations.

use std::fmt;

use parking_lot::Mutex;

use crate::{LogEntry, LogFormat, LogLevel};

/// Destination for rendered log entries.
pub trait LogSink: Send + Sync + fmt::Debug {
    fn write(&self, entry: &LogEntry, format: LogFormat);
}

/// Writes one rendered line per entry to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl LogSink for StderrSink {
    fn write(&self, entry: &LogEntry, format: LogFormat) {
        eprintln!("{}", entry.render(format));
    }
}

/// Drops every entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LogSink for NullSink {
    fn write(&self, _entry: &LogEntry, _format: LogFormat) {}
}

/// Forwards entries as `tracing` events so an installed subscriber decides
/// where they end up.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write(&self, entry: &LogEntry, _format: LogFormat) {
        let fields = serde_json::to_string(&entry.fields).unwrap_or_default();
        let component = entry.component.as_deref().unwrap_or("-");
        let operation_id = entry.operation_id.as_str();

        match entry.level {
            LogLevel::Trace => {
                tracing::trace!(operation_id, component, fields = %fields, "{}", entry.message)
            }
            LogLevel::Debug => {
                tracing::debug!(operation_id, component, fields = %fields, "{}", entry.message)
            }
            LogLevel::Info => {
                tracing::info!(operation_id, component, fields = %fields, "{}", entry.message)
            }
            LogLevel::Warn => {
                tracing::warn!(operation_id, component, fields = %fields, "{}", entry.message)
            }
            LogLevel::Error => {
                tracing::error!(operation_id, component, fields = %fields, "{}", entry.message)
            }
        }
    }
}

/// Keeps entries in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemorySink {
    /// Snapshot of captured entries.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    /// Captured entries with the given message.
    pub fn with_message(&self, message: &str) -> Vec<LogEntry> {
        self.entries
            .lock()
            .iter()
            .filter(|e| e.message == message)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl LogSink for MemorySink {
    fn write(&self, entry: &LogEntry, _format: LogFormat) {
        self.entries.lock().push(entry.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StructuredLogger;
    use std::sync::Arc;

    #[test]
    fn test_memory_sink_captures_and_clears() {
        let sink = Arc::new(MemorySink::default());
        let logger = StructuredLogger::new(sink.clone());

        logger.info("one");
        logger.error("two");
        assert_eq!(sink.entries().len(), 2);
        assert_eq!(sink.with_message("two")[0].level, LogLevel::Error);

        sink.clear();
        assert!(sink.entries().is_empty());
    }

    #[test]
    fn test_tracing_sink_without_subscriber_is_silent() {
        let logger = StructuredLogger::new(Arc::new(TracingSink));
        logger.warn("no subscriber installed");
    }
}
