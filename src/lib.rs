//! Leveled logging facade for request-processing services.
//!
//! - [`LevelLogger`]: one method pair per severity, opt-in exclusive writes.
//! - [`middleware`]: per-request correlation id and request summary lines
//!   for axum (feature `http`).
//! - [`adapter`]: structured events from a transport client's debug calls.
//! - [`parser`]: reads emitted lines back, for asserting on logs.

pub mod level;
pub mod field;
pub mod printf;
pub mod format;
pub mod record;
pub mod sink;
pub mod noop_sink;
pub mod logger;
pub mod parser;
pub mod adapter;
pub mod bridge;
pub mod env;
pub mod init;
pub mod error;

#[cfg(feature = "http")]
pub mod middleware;

pub use error::Error;
pub use field::Field;
pub use format::LineFormat;
pub use level::Level;
pub use logger::LevelLogger;
pub use printf::Arg;
pub use record::LogRecord;
