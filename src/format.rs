//! Line rendering.
//!
//! Text lines look like
//!
//! ```text
//! 2024-05-01 12:00:00.123 INFO => request served method=GET
//! ```
//!
//! that is a millisecond timestamp, the four-character level code and the
//! message separated by ` => `, followed by any structured fields. JSON lines
//! are one serialized [`LogRecord`] each.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::str::FromStr;

use crate::error::Error;
use crate::field::Field;
use crate::level::Level;
use crate::record::LogRecord;

/// Timestamp layout of the text format.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Separator between the level code and the message.
pub const ARROW: &str = " => ";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LineFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "plain" => Ok(LineFormat::Text),
            "json" => Ok(LineFormat::Json),
            _ => Err(Error::UnknownFormat(s.to_string())),
        }
    }
}

impl LineFormat {
    /// Render one line, without the trailing newline.
    pub fn render(
        self,
        level: Level,
        now: DateTime<Utc>,
        caller: &str,
        message: &str,
        fields: &[Field],
    ) -> String {
        match self {
            LineFormat::Text => render_text(level, now, message, fields),
            LineFormat::Json => {
                let record = LogRecord::from_fields(level, now, caller, message, fields);
                serde_json::to_string(&record)
                    .unwrap_or_else(|_| render_text(level, now, message, fields))
            }
        }
    }
}

fn render_text(level: Level, now: DateTime<Utc>, message: &str, fields: &[Field]) -> String {
    let mut line = String::with_capacity(32 + message.len() + fields.len() * 16);
    let _ = write!(line, "{} {}{}{}", now.format(TIME_FORMAT), level.code(), ARROW, message);
    for field in fields {
        let _ = write!(line, " {}", field);
    }
    line
}

/// Decode a text line back into a record.
///
/// The message keeps any rendered `key=value` suffix since the text format
/// does not delimit it.
pub fn parse_text_line(line: &str) -> Option<LogRecord> {
    let (head, message) = line.split_once(ARROW)?;
    let (timestamp, code) = head.rsplit_once(' ')?;
    let level = Level::from_code(code)?;
    let datetime = NaiveDateTime::parse_from_str(timestamp, TIME_FORMAT)
        .ok()?
        .and_utc();

    Some(LogRecord {
        level_name: level.name().to_string(),
        datetime: Some(datetime),
        caller: String::new(),
        message: message.to_string(),
        handler: None,
        connection: None,
        account: None,
        context: Default::default(),
    })
}
