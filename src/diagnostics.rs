use log::debug;
use serde::Serialize;

/// A near-miss observation from marker parsing: a key path whose name looks
/// relevant (`name`/`size`/`offset`/`pos`) on a block entity that failed to
/// resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticRecord {
    /// Absolute position of the block entity the record came from.
    pub position: (i32, i32, i32),
    /// Slash/bracket path of the key inside the block entity's data.
    pub path: String,
    /// Display rendering of the value found there.
    pub value: String,
}

/// Where marker-scan diagnostics go. Emission never changes scan results;
/// the default sink drops everything.
pub trait DiagnosticSink {
    fn emit(&mut self, record: DiagnosticRecord);
}

/// Discards all records.
#[derive(Debug, Default)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn emit(&mut self, _record: DiagnosticRecord) {}
}

/// Renders each record as a JSON line at debug level.
#[derive(Debug, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&mut self, record: DiagnosticRecord) {
        match serde_json::to_string(&record) {
            Ok(line) => debug!("marker near-miss: {}", line),
            Err(e) => debug!("marker near-miss (unserializable: {}): {:?}", e, record),
        }
    }
}

/// Captures records for inspection; used by tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub records: Vec<DiagnosticRecord>,
}

impl DiagnosticSink for RecordingSink {
    fn emit(&mut self, record: DiagnosticRecord) {
        self.records.push(record);
    }
}
