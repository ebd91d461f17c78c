//! Where startup failures and notable events are reported.

use std::sync::Mutex;

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct DiagnosticRecord {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub message: String,
}

impl DiagnosticRecord {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            severity,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }
}

/// Receives diagnostic records
pub trait DiagnosticSink {
    fn report(&self, record: DiagnosticRecord);
}

/// Forwards records to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, record: DiagnosticRecord) {
        let stamp = record.timestamp.format("%H:%M:%S%.3f");
        match record.severity {
            Severity::Info => log::info!("[{}] {}", stamp, record.message),
            Severity::Warning => log::warn!("[{}] {}", stamp, record.message),
            Severity::Error => log::error!("[{}] {}", stamp, record.message),
        }
    }
}

/// Keeps every record in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<DiagnosticRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<DiagnosticRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.records()
            .iter()
            .filter(|r| r.severity == severity)
            .count()
    }
}

impl DiagnosticSink for MemorySink {
    fn report(&self, record: DiagnosticRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_keeps_order() {
        let sink = MemorySink::new();
        sink.report(DiagnosticRecord::new(Severity::Info, "first"));
        sink.report(DiagnosticRecord::error("second"));

        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].message, "first");
        assert_eq!(records[1].severity, Severity::Error);
        assert!(records[0].timestamp <= records[1].timestamp);
    }

    #[test]
    fn test_memory_sink_count_by_severity() {
        let sink = MemorySink::new();
        sink.report(DiagnosticRecord::error("a"));
        sink.report(DiagnosticRecord::new(Severity::Warning, "b"));
        sink.report(DiagnosticRecord::error("c"));

        assert_eq!(sink.count(Severity::Error), 2);
        assert_eq!(sink.count(Severity::Warning), 1);
        assert_eq!(sink.count(Severity::Info), 0);
    }

    #[test]
    fn test_log_sink_accepts_records() {
        LogSink.report(DiagnosticRecord::error("nothing listens in tests"));
    }
}
