use serde::Deserialize;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::bridge::BridgeLayer;
use crate::env::{env_or, LOG_FACADE_EXCLUSIVE_ENV, LOG_FACADE_FORMAT_ENV, LOG_FACADE_LEVEL_ENV};
use crate::error::Error;
use crate::format::LineFormat;
use crate::level::Level;
use crate::logger::LevelLogger;
use crate::sink::LogSink;

/// Logger configuration.
///
/// **Fields**
/// - `level`: least severe level that still gets written.
/// - `format`: text arrow lines or JSON records.
/// - `exclusive`: serialize writes through a lock (see
///   [`LevelLogger::exclusive`]).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub level: Level,
    pub format: LineFormat,
    pub exclusive: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: Level::Info,
            format: LineFormat::Text,
            exclusive: false,
        }
    }
}

impl LoggerConfig {
    /// Read the `LOG_FACADE_*` variables, defaulting whatever is unset.
    pub fn from_env() -> Result<Self, Error> {
        let defaults = Self::default();
        let level = env_or(LOG_FACADE_LEVEL_ENV, defaults.level.name()).parse()?;
        let format = env_or(LOG_FACADE_FORMAT_ENV, "text").parse()?;
        let exclusive = parse_bool(LOG_FACADE_EXCLUSIVE_ENV, &env_or(LOG_FACADE_EXCLUSIVE_ENV, "false"))?;
        Ok(Self { level, format, exclusive })
    }

    /// Build a logger writing to `sink`.
    pub fn build(&self, sink: Arc<dyn LogSink>) -> LevelLogger {
        let mut logger = LevelLogger::new(self.level, self.format, sink);
        if self.exclusive {
            logger.exclusive();
        }
        logger
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, Error> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(Error::InvalidEnv { key, value: value.to_string() }),
    }
}

/// Install a global `tracing` subscriber that routes every event through
/// `logger`.
///
/// `RUST_LOG` narrows which events reach the logger; without it, events at
/// the logger's own threshold pass.
///
/// **Returns**
/// - `Err(..)` if a global subscriber is already installed.
pub fn init_tracing(logger: LevelLogger) -> Result<(), Error> {
    let default_directive = match logger.threshold() {
        Level::Critical | Level::Error => "error",
        Level::Warning => "warn",
        Level::Notice | Level::Info => "info",
        Level::Debug => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    Registry::default()
        .with(filter)
        .with(BridgeLayer::new(logger))
        .try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::BufferSink;

    #[test]
    fn defaults_are_info_text_unsynchronized() {
        let config = LoggerConfig::default();
        assert_eq!(config.level, Level::Info);
        assert_eq!(config.format, LineFormat::Text);
        assert!(!config.exclusive);
    }

    #[test]
    fn deserializes_partial_config() {
        let config: LoggerConfig =
            serde_json::from_str(r#"{"level": "debug", "exclusive": true}"#).unwrap();
        assert_eq!(config.level, Level::Debug);
        assert_eq!(config.format, LineFormat::Text);
        assert!(config.exclusive);
    }

    #[test]
    fn build_honours_exclusive_flag() {
        let config = LoggerConfig { exclusive: true, ..LoggerConfig::default() };
        let logger = config.build(Arc::new(BufferSink::new()));
        assert!(logger.is_exclusive());
        assert_eq!(logger.threshold(), Level::Info);
    }

    #[test]
    fn parse_bool_rejects_garbage() {
        assert!(parse_bool(LOG_FACADE_EXCLUSIVE_ENV, "TRUE").unwrap());
        assert!(!parse_bool(LOG_FACADE_EXCLUSIVE_ENV, "").unwrap());
        assert!(parse_bool(LOG_FACADE_EXCLUSIVE_ENV, "maybe").is_err());
    }
}
