//! Environment variable names used by this crate for convenient
//! configuration of loggers from services.
//!
//! These are purely helpers; [`crate::LevelLogger`] itself never reads the
//! environment.

/// Level threshold, e.g. `info` or `debug`.
pub const LOG_FACADE_LEVEL_ENV: &str = "LOG_FACADE_LEVEL";

/// Line format: `text` or `json`.
pub const LOG_FACADE_FORMAT_ENV: &str = "LOG_FACADE_FORMAT";

/// `true`/`1` enables exclusive writes.
pub const LOG_FACADE_EXCLUSIVE_ENV: &str = "LOG_FACADE_EXCLUSIVE";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
