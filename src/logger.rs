//! Leveled logging facade.
//!
//! A [`LevelLogger`] renders each call into one line and hands it to a
//! [`LogSink`]. By default writes are unsynchronized: a sink that does not
//! write lines atomically may see bytes from concurrent callers interleave,
//! and callers that share a logger across threads own that tradeoff.
//! [`LevelLogger::exclusive`] installs a lock that every subsequent write
//! goes through.
//!
//! ```
//! use std::sync::Arc;
//! use tracing_log_facade::{args, Level, LevelLogger, LineFormat, sink::BufferSink};
//!
//! let sink = BufferSink::new();
//! let mut logger = LevelLogger::new(Level::Debug, LineFormat::Text, Arc::new(sink.clone()));
//! logger.exclusive();
//! logger.infof("%d workers started", args![4]);
//! assert!(sink.contents_string().contains("INFO => 4 workers started"));
//! ```

use chrono::Utc;
use parking_lot::Mutex;
use std::panic::Location;
use std::sync::Arc;

use crate::field::Field;
use crate::format::LineFormat;
use crate::level::Level;
use crate::printf::{sprint, sprintf, Arg};
use crate::sink::{LogSink, StdoutSink};

/// Leveled logger with an optional write guard.
///
/// Clones and loggers derived with [`LevelLogger::with`] share the sink and
/// the guard of the logger they came from. Separately constructed loggers
/// never share a guard, even when they write to the same sink.
#[derive(Clone)]
pub struct LevelLogger {
    threshold: Level,
    format: LineFormat,
    sink: Arc<dyn LogSink>,
    guard: Option<Arc<Mutex<()>>>,
    fields: Arc<[Field]>,
}

macro_rules! level_methods {
    ($($level:ident => $values:ident, $formatted:ident;)*) => {
        $(
            #[doc = concat!("Log values at `", stringify!($level), "` level, concatenated like [`sprint`].")]
            #[track_caller]
            pub fn $values(&self, values: &[Arg]) {
                self.log_lazy(Level::$level, || sprint(values));
            }

            #[doc = concat!("Log a printf-style message at `", stringify!($level), "` level.")]
            #[track_caller]
            pub fn $formatted(&self, format: &str, args: &[Arg]) {
                self.log_lazy(Level::$level, || sprintf(format, args));
            }
        )*
    };
}

impl LevelLogger {
    pub fn new(threshold: Level, format: LineFormat, sink: Arc<dyn LogSink>) -> Self {
        Self {
            threshold,
            format,
            sink,
            guard: None,
            fields: Arc::from(Vec::new()),
        }
    }

    /// Text-format logger writing to standard output.
    pub fn stdout(threshold: Level) -> Self {
        Self::new(threshold, LineFormat::Text, Arc::new(StdoutSink))
    }

    /// Serialize all further writes through a lock.
    ///
    /// Idempotent: the guard is installed once and never removed. Call it
    /// while setting the logger up, before sharing it between threads.
    pub fn exclusive(&mut self) -> &mut Self {
        if self.guard.is_none() {
            self.guard = Some(Arc::new(Mutex::new(())));
        }
        self
    }

    pub fn is_exclusive(&self) -> bool {
        self.guard.is_some()
    }

    pub fn threshold(&self) -> Level {
        self.threshold
    }

    pub fn format(&self) -> LineFormat {
        self.format
    }

    /// Derive a logger that adds `fields` to every line it writes.
    pub fn with(&self, fields: impl IntoIterator<Item = Field>) -> LevelLogger {
        let merged: Vec<Field> = self.fields.iter().cloned().chain(fields).collect();
        LevelLogger {
            fields: Arc::from(merged),
            ..self.clone()
        }
    }

    pub fn enabled(&self, level: Level) -> bool {
        level.enabled_at(self.threshold)
    }

    /// Log `message` with extra structured fields.
    #[track_caller]
    pub fn log(&self, level: Level, message: &str, fields: &[Field]) {
        if self.enabled(level) {
            self.write(level, &location(Location::caller()), message, fields);
        }
    }

    /// Like [`LevelLogger::log`], with the caller given as `file:line` instead
    /// of taken from the call site.
    pub fn log_at(&self, level: Level, caller: &str, message: &str, fields: &[Field]) {
        if self.enabled(level) {
            self.write(level, caller, message, fields);
        }
    }

    #[track_caller]
    fn log_lazy(&self, level: Level, message: impl FnOnce() -> String) {
        if self.enabled(level) {
            self.write(level, &location(Location::caller()), &message(), &[]);
        }
    }

    fn write(&self, level: Level, caller: &str, message: &str, extra: &[Field]) {
        let now = Utc::now();
        let line = if extra.is_empty() {
            self.format.render(level, now, caller, message, &self.fields)
        } else {
            let fields: Vec<Field> = self.fields.iter().chain(extra).cloned().collect();
            self.format.render(level, now, caller, message, &fields)
        };

        let _guard = self.guard.as_ref().map(|guard| guard.lock());
        if let Err(e) = self.sink.write_line(&line) {
            eprintln!("log sink write failed: {}", e);
        }
    }

    fn write_terminal(&self, caller: &Location<'_>, message: &str) {
        self.write(Level::Critical, &location(caller), message, &[]);
        let _guard = self.guard.as_ref().map(|guard| guard.lock());
        let _ = self.sink.flush();
    }

    /// Write at critical level, then exit the process with status 1.
    #[track_caller]
    pub fn fatal(&self, values: &[Arg]) -> ! {
        self.write_terminal(Location::caller(), &sprint(values));
        std::process::exit(1)
    }

    /// Printf-style [`LevelLogger::fatal`].
    #[track_caller]
    pub fn fatalf(&self, format: &str, args: &[Arg]) -> ! {
        self.write_terminal(Location::caller(), &sprintf(format, args));
        std::process::exit(1)
    }

    /// Write at critical level, then panic with the same message.
    ///
    /// The guard is released before unwinding starts.
    #[track_caller]
    pub fn panic(&self, values: &[Arg]) -> ! {
        let message = sprint(values);
        self.write_terminal(Location::caller(), &message);
        panic!("{}", message)
    }

    /// Printf-style [`LevelLogger::panic`].
    #[track_caller]
    pub fn panicf(&self, format: &str, args: &[Arg]) -> ! {
        let message = sprintf(format, args);
        self.write_terminal(Location::caller(), &message);
        panic!("{}", message)
    }

    level_methods! {
        Critical => critical, criticalf;
        Error => error, errorf;
        Warning => warning, warningf;
        Notice => notice, noticef;
        Info => info, infof;
        Debug => debug, debugf;
    }
}

fn location(caller: &Location<'_>) -> String {
    format!("{}:{}", caller.file(), caller.line())
}

impl std::fmt::Debug for LevelLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LevelLogger")
            .field("threshold", &self.threshold)
            .field("format", &self.format)
            .field("exclusive", &self.is_exclusive())
            .field("fields", &self.fields)
            .finish()
    }
}
