//! Structured logging for an external transport API client.
//!
//! The client reports its traffic through printf-style debug calls with a
//! handful of fixed templates. [`ClientCallAdapter`] recognizes those
//! templates and turns each call into one [`ClientCallEvent`] with named
//! fields instead of a pre-formatted string. Anything it does not recognize
//! is formatted and logged as plain text.
//!
//! Argument lists shorter than a template expects are tolerated: the missing
//! fields are left empty.

use crate::field::{Field, HTTP_METHOD_ATTR};
use crate::level::Level;
use crate::logger::LevelLogger;
use crate::printf::{sprintf, Arg};

/// Template the client uses for an outgoing request.
pub const REQUEST_TEMPLATE: &str = "MG TRANSPORT API Request: %s %s %s %v";
/// Template the client uses for an outgoing request whose body is a file upload.
pub const REQUEST_WITH_FILE_TEMPLATE: &str = "MG TRANSPORT API Request: %s %s %s [file data]";
/// Template the client uses for a received response.
pub const RESPONSE_TEMPLATE: &str = "MG TRANSPORT API Response: %s";

pub const REQUEST_MESSAGE: &str = "MG TRANSPORT API Request";
pub const RESPONSE_MESSAGE: &str = "MG TRANSPORT API Response";

/// Logged in place of file contents.
pub const FILE_BODY_PLACEHOLDER: &str = "[file data]";

/// Printf-style logging capability expected by the client.
pub trait BasicLogger {
    fn printf(&self, format: &str, args: &[Arg]);
}

/// Debug logging capability expected by the client.
pub trait DebugLogger {
    fn debugf(&self, format: &str, args: &[Arg]);
}

/// Which client template a call was made with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Request,
    RequestWithFile,
    Response,
}

impl MessageKind {
    /// Match a format string against the known templates, exactly.
    pub fn detect(format: &str) -> Option<MessageKind> {
        match format {
            REQUEST_TEMPLATE => Some(MessageKind::Request),
            REQUEST_WITH_FILE_TEMPLATE => Some(MessageKind::RequestWithFile),
            RESPONSE_TEMPLATE => Some(MessageKind::Response),
            _ => None,
        }
    }
}

/// What a single client call is logged as.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCallEvent {
    Request {
        method: String,
        url: String,
        token: String,
        body: Option<Arg>,
    },
    Response {
        body: Option<Arg>,
    },
    Raw {
        message: String,
    },
}

impl ClientCallEvent {
    /// Classify a call by its format string.
    pub fn classify(format: &str, args: &[Arg]) -> Self {
        match MessageKind::detect(format) {
            Some(kind) => Self::from_kind(kind, args),
            None => ClientCallEvent::Raw { message: sprintf(format, args) },
        }
    }

    /// Build the event for a call whose template is already known.
    pub fn from_kind(kind: MessageKind, args: &[Arg]) -> Self {
        match kind {
            MessageKind::Request | MessageKind::RequestWithFile => {
                let text = |i: usize| args.get(i).map(ToString::to_string).unwrap_or_default();
                // File uploads are never logged, whatever sits in the body slot.
                let body = if kind == MessageKind::RequestWithFile {
                    Some(Arg::from(FILE_BODY_PLACEHOLDER))
                } else {
                    args.get(3).cloned()
                };
                ClientCallEvent::Request {
                    method: text(0),
                    url: text(1),
                    token: text(2),
                    body,
                }
            }
            MessageKind::Response => ClientCallEvent::Response { body: args.first().cloned() },
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ClientCallEvent::Request { .. } => REQUEST_MESSAGE,
            ClientCallEvent::Response { .. } => RESPONSE_MESSAGE,
            ClientCallEvent::Raw { message } => message,
        }
    }

    pub fn fields(&self) -> Vec<Field> {
        match self {
            ClientCallEvent::Request { method, url, token, body } => vec![
                Field::string(HTTP_METHOD_ATTR, method),
                Field::string("url", url),
                Field::string("token", token),
                Field::body(body.as_ref()),
            ],
            ClientCallEvent::Response { body } => vec![Field::body(body.as_ref())],
            ClientCallEvent::Raw { .. } => Vec::new(),
        }
    }
}

/// Logs client calls through a [`LevelLogger`] at debug level.
#[derive(Debug, Clone)]
pub struct ClientCallAdapter {
    log: LevelLogger,
}

impl ClientCallAdapter {
    pub fn new(log: LevelLogger) -> Self {
        Self { log }
    }

    pub fn logger(&self) -> &LevelLogger {
        &self.log
    }

    /// Log a call whose template the client reports structurally, skipping
    /// format string matching.
    #[track_caller]
    pub fn log_kind(&self, kind: MessageKind, args: &[Arg]) {
        self.emit(&ClientCallEvent::from_kind(kind, args));
    }

    #[track_caller]
    fn emit(&self, event: &ClientCallEvent) {
        self.log.log(Level::Debug, event.message(), &event.fields());
    }
}

impl DebugLogger for ClientCallAdapter {
    #[track_caller]
    fn debugf(&self, format: &str, args: &[Arg]) {
        if self.log.enabled(Level::Debug) {
            self.emit(&ClientCallEvent::classify(format, args));
        }
    }
}

impl BasicLogger for ClientCallAdapter {
    #[track_caller]
    fn printf(&self, format: &str, args: &[Arg]) {
        self.debugf(format, args);
    }
}
