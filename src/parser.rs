//! Reads emitted log lines back into [`LogRecord`]s.
//!
//! Mostly used by tests that assert on what a logger wrote:
//!
//! ```
//! use tracing_log_facade::parser::RecordParser;
//!
//! let input = "{\"level_name\":\"INFO\",\"message\":\"ready\"}\n";
//! let records = RecordParser::new(input.as_bytes()).all_records().unwrap();
//! assert_eq!(records[0].message, "ready");
//! ```

use std::io::{self, BufRead};

use crate::format::{parse_text_line, LineFormat};
use crate::record::LogRecord;

#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("failed to read log input: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: invalid log record: {source}")]
    Decode {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: not a text log line")]
    Text { line: usize },
}

/// Records decoded before the first failure, along with that failure.
#[derive(thiserror::Error, Debug)]
#[error("{source} ({} records decoded before it)", .records.len())]
pub struct PartialParseError {
    pub records: Vec<LogRecord>,
    #[source]
    pub source: ParseError,
}

/// Decodes newline-delimited log lines one record at a time.
pub struct RecordParser<R> {
    reader: R,
    format: LineFormat,
    line_number: usize,
    buf: String,
    current: Option<LogRecord>,
}

impl<R: BufRead> RecordParser<R> {
    /// Parser for JSON record lines.
    pub fn new(reader: R) -> Self {
        Self::with_format(reader, LineFormat::Json)
    }

    /// Parser for text arrow-format lines.
    pub fn text(reader: R) -> Self {
        Self::with_format(reader, LineFormat::Text)
    }

    pub fn with_format(reader: R, format: LineFormat) -> Self {
        Self {
            reader,
            format,
            line_number: 0,
            buf: String::new(),
            current: None,
        }
    }

    /// Decode the next line.
    ///
    /// Returns `Ok(None)` once input is exhausted; that is not an error.
    pub fn next_record(&mut self) -> Result<Option<LogRecord>, ParseError> {
        self.buf.clear();
        if self.reader.read_line(&mut self.buf)? == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        let line = self.buf.trim_end_matches(['\n', '\r']);
        let record = match self.format {
            LineFormat::Json => serde_json::from_str::<LogRecord>(line).map_err(|source| {
                ParseError::Decode { line: self.line_number, source }
            })?,
            LineFormat::Text => parse_text_line(line)
                .ok_or(ParseError::Text { line: self.line_number })?,
        };

        self.current = Some(record.clone());
        Ok(Some(record))
    }

    /// The record decoded by the last successful [`RecordParser::next_record`].
    pub fn record(&self) -> Option<&LogRecord> {
        self.current.as_ref()
    }

    /// Decode every remaining line.
    ///
    /// Stops at the first bad line; the records before it are kept in the
    /// returned [`PartialParseError`].
    pub fn all_records(&mut self) -> Result<Vec<LogRecord>, PartialParseError> {
        let mut records = Vec::new();
        loop {
            match self.next_record() {
                Ok(Some(record)) => records.push(record),
                Ok(None) => return Ok(records),
                Err(source) => return Err(PartialParseError { records, source }),
            }
        }
    }
}

impl<R: BufRead> Iterator for RecordParser<R> {
    type Item = Result<LogRecord, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINES: &str = concat!(
        r#"{"level_name":"INFO","message":"one","datetime":"2024-05-01T12:00:00.123Z"}"#,
        "\n",
        r#"{"level_name":"DEBUG","message":"two","caller":"a.rs:1","context":{"k":1}}"#,
        "\n",
        "{not json\n",
        r#"{"level_name":"INFO","message":"four"}"#,
        "\n",
        r#"{"level_name":"INFO","message":"five"}"#,
        "\n",
    );

    #[test]
    fn all_records_keeps_prefix_before_bad_line() {
        let err = RecordParser::new(LINES.as_bytes()).all_records().unwrap_err();
        assert_eq!(err.records.len(), 2);
        assert_eq!(err.records[0].message, "one");
        assert_eq!(err.records[1].message, "two");
        assert!(matches!(err.source, ParseError::Decode { line: 3, .. }));
    }

    #[test]
    fn next_record_signals_end_of_input() {
        let mut parser = RecordParser::new("{\"level_name\":\"INFO\",\"message\":\"x\"}\n".as_bytes());
        assert_eq!(parser.next_record().unwrap().unwrap().message, "x");
        assert_eq!(parser.record().map(|r| r.message.as_str()), Some("x"));
        assert!(parser.next_record().unwrap().is_none());
        assert!(parser.next_record().unwrap().is_none());
    }

    #[test]
    fn tolerates_missing_optional_fields() {
        let records = RecordParser::new(r#"{"level_name":"ERROR","message":"m"}"#.as_bytes())
            .all_records()
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].handler, None);
        assert_eq!(records[0].datetime, None);
    }

    #[test]
    fn accepts_null_for_optional_fields() {
        let input = concat!(
            r#"{"level_name":"INFO","message":"x","caller":null,"context":null}"#,
            "\n",
            r#"{"level_name":"INFO","message":"y","datetime":null,"account":null}"#,
            "\n",
        );
        let records = RecordParser::new(input.as_bytes()).all_records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].caller, "");
        assert!(records[0].context.is_empty());
        assert_eq!(records[1].account, None);
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let err = RecordParser::new(r#"{"message":"m"}"#.as_bytes()).all_records().unwrap_err();
        assert!(err.records.is_empty());
    }

    #[test]
    fn iterator_yields_errors_in_place() {
        let results: Vec<_> = RecordParser::new(LINES.as_bytes()).collect();
        assert_eq!(results.len(), 5);
        assert!(results[2].is_err());
        assert!(results[3].is_ok());
    }

    #[test]
    fn parses_text_lines() {
        let input = "2024-05-01 12:00:00.123 ERRO => failed\n2024-05-01 12:00:01.000 INFO => ok\n";
        let records = RecordParser::text(input.as_bytes()).all_records().unwrap();
        assert_eq!(records[0].level_name, "ERROR");
        assert_eq!(records[1].message, "ok");
    }
}
