/// Errors returned while configuring the facade.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unknown log level: {0:?}")]
    UnknownLevel(String),

    #[error("unknown line format: {0:?}")]
    UnknownFormat(String),

    #[error("invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("failed to install global tracing subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}
