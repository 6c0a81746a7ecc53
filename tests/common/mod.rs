//! Shared helpers for integration tests.

use std::sync::Arc;

use tracing_log_facade::parser::RecordParser;
use tracing_log_facade::sink::BufferSink;
use tracing_log_facade::{Level, LevelLogger, LineFormat, LogRecord};

/// Debug-level JSON logger writing into a buffer.
pub fn json_logger() -> (LevelLogger, BufferSink) {
    logger_at(Level::Debug)
}

#[allow(dead_code)]
pub fn logger_at(level: Level) -> (LevelLogger, BufferSink) {
    let sink = BufferSink::new();
    let logger = LevelLogger::new(level, LineFormat::Json, Arc::new(sink.clone()));
    (logger, sink)
}

/// Every record written to `sink` so far.
pub fn records(sink: &BufferSink) -> Vec<LogRecord> {
    RecordParser::new(sink.contents().as_slice())
        .all_records()
        .expect("logger output should parse")
}
