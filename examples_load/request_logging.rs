use std::net::SocketAddr;

use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tracing_log_facade::adapter::{ClientCallAdapter, DebugLogger, REQUEST_TEMPLATE};
use tracing_log_facade::init::{init_tracing, LoggerConfig};
use tracing_log_facade::middleware::{log_requests, RequestLogger};
use tracing_log_facade::sink::StdoutSink;
use tracing_log_facade::args;

async fn send_message(RequestLogger(log): RequestLogger) -> &'static str {
    log.info(args!["forwarding message to transport"]);
    let client_log = ClientCallAdapter::new(log);
    client_log.debugf(REQUEST_TEMPLATE, args!["POST", "/api/messages", "t0k3n", r#"{"text":"hi"}"#]);
    "sent"
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = LoggerConfig::from_env()?;
    let logger = config.build(std::sync::Arc::new(StdoutSink));
    init_tracing(logger.clone())?;

    let app = Router::new()
        .route("/send", get(send_message))
        .layer(middleware::from_fn_with_state(logger.clone(), log_requests));

    let listener = TcpListener::bind("127.0.0.1:3000").await?;
    logger.infof("listening on %s", args![listener.local_addr()?.to_string()]);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}
