//! Request-scoped logging for axum services.
//!
//! # Data Flow
//! ```text
//! request
//!     → log_requests: new StreamId, derived logger (base + streamId)
//!     → request extensions: StreamId, RequestLogger
//!     → handler: RequestLogger extractor returns the derived logger
//!     → log_requests: one "request" line with timing and outcome
//! ```
//!
//! Install with `from_fn_with_state`:
//!
//! ```no_run
//! use axum::{middleware, routing::get, Router};
//! use tracing_log_facade::{args, Level, LevelLogger};
//! use tracing_log_facade::middleware::{log_requests, RequestLogger};
//!
//! async fn hello(RequestLogger(log): RequestLogger) -> &'static str {
//!     log.info(args!["saying hello"]);
//!     "hello"
//! }
//!
//! let logger = LevelLogger::stdout(Level::Info);
//! let app: Router = Router::new()
//!     .route("/", get(hello))
//!     .layer(middleware::from_fn_with_state(logger, log_requests));
//! ```

use axum::{
    body::HttpBody,
    extract::{ConnectInfo, FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, Uri},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, SecondsFormat, Utc};
use std::convert::Infallible;
use std::fmt;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::field::{Field, HANDLER_ATTR, HTTP_METHOD_ATTR};
use crate::level::Level;
use crate::logger::LevelLogger;

/// Value of the `handler` tag on request summary lines.
pub const HANDLER_TAG: &str = "AXUM";

/// Message of the per-request summary line.
pub const REQUEST_MESSAGE: &str = "request";

/// Correlation id of one request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamId(String);

impl StreamId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The logger derived for the current request.
///
/// Extracting it from a request that did not pass through [`log_requests`]
/// panics: a handler without request logging is a wiring mistake.
#[derive(Debug, Clone)]
pub struct RequestLogger(pub LevelLogger);

impl<S> FromRequestParts<S> for RequestLogger
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<RequestLogger>() {
            Some(logger) => Ok(logger.clone()),
            None => missing_logger(),
        }
    }
}

/// Extension trait for reading the request logger off a request.
pub trait RequestLoggerExt {
    fn request_logger(&self) -> Option<&LevelLogger>;

    /// Like [`RequestLoggerExt::request_logger`], but panics when the
    /// middleware was not installed.
    #[track_caller]
    fn must_logger(&self) -> &LevelLogger {
        match self.request_logger() {
            Some(logger) => logger,
            None => missing_logger(),
        }
    }
}

impl<B> RequestLoggerExt for axum::http::Request<B> {
    fn request_logger(&self) -> Option<&LevelLogger> {
        self.extensions().get::<RequestLogger>().map(|l| &l.0)
    }
}

#[track_caller]
fn missing_logger() -> ! {
    panic!("no request logger in request extensions; is the log_requests middleware installed?")
}

/// Middleware: derive a per-request logger and write a summary line once
/// the inner service has responded.
pub async fn log_requests(
    State(logger): State<LevelLogger>,
    mut request: Request,
    next: Next,
) -> Response {
    let start = Utc::now();
    let started = Instant::now();
    let method = request.method().to_string();
    let path = request_path(request.uri());
    let remote_address = client_ip(
        request.headers(),
        request.extensions().get::<ConnectInfo<SocketAddr>>(),
    );

    let stream_id = StreamId::generate();
    let log = logger.with([Field::stream_id(&stream_id)]);
    request.extensions_mut().insert(stream_id);
    request.extensions_mut().insert(RequestLogger(log.clone()));

    let response = next.run(request).await;

    let elapsed = started.elapsed();
    let end = Utc::now();
    let fields = [
        Field::string(HANDLER_ATTR, HANDLER_TAG),
        Field::string("startTime", rfc3339(start)),
        Field::string("endTime", rfc3339(end)),
        Field::int("latency", latency_ms(elapsed)),
        Field::string("remoteAddress", remote_address),
        Field::string(HTTP_METHOD_ATTR, method),
        Field::string("path", path),
        Field::int("bodySize", body_size(&response)),
    ];
    log.log(Level::Info, REQUEST_MESSAGE, &fields);

    response
}

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Whole milliseconds of a monotonic duration, truncated.
pub fn latency_ms(elapsed: Duration) -> i64 {
    i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
}

/// Path plus `?query`, or just the path when the query is empty.
pub fn request_path(uri: &Uri) -> String {
    match uri.query() {
        Some(query) if !query.is_empty() => format!("{}?{}", uri.path(), query),
        _ => uri.path().to_string(),
    }
}

/// Client address: first `X-Forwarded-For` hop, then `X-Real-IP`, then the
/// socket peer.
pub fn client_ip(headers: &HeaderMap, peer: Option<&ConnectInfo<SocketAddr>>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    match forwarded.or_else(real_ip) {
        Some(ip) => ip.to_string(),
        None => peer.map(|ConnectInfo(addr)| addr.ip().to_string()).unwrap_or_default(),
    }
}

/// Response body length in bytes, `-1` when it is not known up front.
fn body_size(response: &Response) -> i64 {
    if let Some(exact) = response.body().size_hint().exact() {
        return exact as i64;
    }
    response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(-1)
}
