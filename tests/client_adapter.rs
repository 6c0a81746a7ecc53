//! Client call adapter writing through a real logger.

use serde_json::json;
use tracing_log_facade::adapter::{
    BasicLogger, ClientCallAdapter, DebugLogger, MessageKind, FILE_BODY_PLACEHOLDER,
    REQUEST_TEMPLATE, REQUEST_WITH_FILE_TEMPLATE, RESPONSE_TEMPLATE,
};
use tracing_log_facade::printf::sprintf;
use tracing_log_facade::{args, Level};

mod common;

#[test]
fn request_call_becomes_structured_debug_line() {
    let (logger, sink) = common::json_logger();
    let adapter = ClientCallAdapter::new(logger);

    adapter.debugf(
        REQUEST_TEMPLATE,
        args!["POST", "https://transport.local/api/v1/messages", "t0k3n", r#"{"chat":42}"#],
    );

    let records = common::records(&sink);
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.level_name, "DEBUG");
    assert_eq!(record.message, "MG TRANSPORT API Request");
    assert_eq!(record.context_str("method"), Some("POST"));
    assert_eq!(record.context_str("url"), Some("https://transport.local/api/v1/messages"));
    assert_eq!(record.context_str("token"), Some("t0k3n"));
    assert_eq!(record.context["body"], json!({"chat": 42}));
}

#[test]
fn file_upload_body_is_never_written() {
    let (logger, sink) = common::json_logger();
    let adapter = ClientCallAdapter::new(logger);

    adapter.debugf(
        REQUEST_WITH_FILE_TEMPLATE,
        args!["POST", "/files/upload", "t0k3n", b"RAW-FILE-CONTENT".to_vec()],
    );

    assert!(!sink.contents_string().contains("RAW-FILE-CONTENT"));
    let record = common::records(&sink).remove(0);
    assert_eq!(record.context_str("body"), Some(FILE_BODY_PLACEHOLDER));
    assert_eq!(record.context_str("url"), Some("/files/upload"));
}

#[test]
fn response_call_logs_only_the_body() {
    let (logger, sink) = common::json_logger();
    ClientCallAdapter::new(logger).debugf(RESPONSE_TEMPLATE, args![r#"{"ok":true}"#]);

    let record = common::records(&sink).remove(0);
    assert_eq!(record.message, "MG TRANSPORT API Response");
    assert_eq!(record.context.len(), 1);
    assert_eq!(record.context["body"], json!({"ok": true}));
}

#[test]
fn byte_response_body_is_decoded() {
    let (logger, sink) = common::json_logger();
    let adapter = ClientCallAdapter::new(logger);

    adapter.debugf(RESPONSE_TEMPLATE, args![br#"{"ok":true}"#.to_vec()]);
    adapter.debugf(RESPONSE_TEMPLATE, args![b"Bad Gateway".to_vec()]);

    let records = common::records(&sink);
    assert_eq!(records[0].context["body"], json!({"ok": true}));
    assert_eq!(records[1].context_str("body"), Some("Bad Gateway"));
}

#[test]
fn client_format_strings_are_recognized() {
    let (logger, sink) = common::json_logger();
    let adapter = ClientCallAdapter::new(logger);

    adapter.debugf("MG TRANSPORT API Response: %s", args![r#"{"ok":true}"#]);
    adapter.debugf(
        "MG TRANSPORT API Request: %s %s %s %v",
        args!["GET", "/api/v1/channels", "t", None::<String>],
    );

    let records = common::records(&sink);
    assert_eq!(records[0].message, "MG TRANSPORT API Response");
    assert_eq!(records[0].context["body"], json!({"ok": true}));
    assert_eq!(records[1].message, "MG TRANSPORT API Request");
    assert_eq!(records[1].context["body"], serde_json::Value::Null);
}

#[test]
fn oversized_json_body_is_truncated() {
    let (logger, sink) = common::json_logger();
    let items: Vec<u32> = (0..200_000).collect();
    let body = serde_json::to_string(&items).unwrap();

    ClientCallAdapter::new(logger).debugf(REQUEST_TEMPLATE, args!["POST", "/api", "t", body]);

    assert!(sink.contents().len() < 4 * 1024);
    let record = common::records(&sink).remove(0);
    assert!(record.context_str("body").unwrap().ends_with("..."));
}

#[test]
fn oversized_width_in_unknown_format_renders_inline() {
    let (logger, sink) = common::json_logger();
    ClientCallAdapter::new(logger).debugf("%18446744073709551615d done", args![1]);

    let record = common::records(&sink).remove(0);
    assert_eq!(record.message, "%!(BADWIDTH)1 done");
}

#[test]
fn unknown_format_is_logged_as_formatted_text() {
    let (logger, sink) = common::json_logger();
    let format = "retry %d of %d for %s";
    let values = args![2, 5, "/api/v1/bots"];

    ClientCallAdapter::new(logger).debugf(format, values);

    let record = common::records(&sink).remove(0);
    assert_eq!(record.message, sprintf(format, values));
    assert_eq!(record.message, "retry 2 of 5 for /api/v1/bots");
    assert!(record.context.is_empty());
}

#[test]
fn printf_and_debugf_write_the_same_line() {
    let (logger, sink) = common::json_logger();
    let adapter = ClientCallAdapter::new(logger);

    adapter.printf(REQUEST_TEMPLATE, args!["GET", "/api/v1/channels", "t"]);
    adapter.debugf(REQUEST_TEMPLATE, args!["GET", "/api/v1/channels", "t"]);

    let records = common::records(&sink);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].message, records[1].message);
    assert_eq!(records[0].context, records[1].context);
}

#[test]
fn structural_kind_skips_template_matching() {
    let (logger, sink) = common::json_logger();
    ClientCallAdapter::new(logger).log_kind(MessageKind::Response, args!["plain text"]);

    let record = common::records(&sink).remove(0);
    assert_eq!(record.message, "MG TRANSPORT API Response");
    assert_eq!(record.context_str("body"), Some("plain text"));
}

#[test]
fn nothing_is_written_above_debug_threshold() {
    let (logger, sink) = common::logger_at(Level::Info);
    let adapter = ClientCallAdapter::new(logger);
    adapter.debugf(REQUEST_TEMPLATE, args!["GET", "/x", "t"]);
    adapter.printf("free %s", args!["text"]);
    assert!(sink.contents().is_empty());
}
