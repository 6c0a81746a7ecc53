use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::field::{Field, ACCOUNT_ATTR, CONNECTION_ATTR, HANDLER_ATTR};
use crate::level::Level;

/// One structured log line.
///
/// The JSON line format writes this type and [`crate::parser::RecordParser`]
/// reads it back. `level_name` and `message` are required on decode; every
/// other field tolerates being absent or `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub level_name: String,
    #[serde(default)]
    pub datetime: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub caller: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub context: BTreeMap<String, Value>,
}

impl LogRecord {
    /// Assemble a record, lifting the handler/connection/account tags out of
    /// `fields` and keeping everything else under `context`.
    pub fn from_fields(
        level: Level,
        datetime: DateTime<Utc>,
        caller: impl Into<String>,
        message: impl Into<String>,
        fields: &[Field],
    ) -> Self {
        let mut record = LogRecord {
            level_name: level.name().to_string(),
            datetime: Some(datetime),
            caller: caller.into(),
            message: message.into(),
            handler: None,
            connection: None,
            account: None,
            context: BTreeMap::new(),
        };

        for field in fields {
            let tag = match field.key.as_str() {
                HANDLER_ATTR => &mut record.handler,
                CONNECTION_ATTR => &mut record.connection,
                ACCOUNT_ATTR => &mut record.account,
                _ => {
                    record.context.insert(field.key.clone(), field.value.clone());
                    continue;
                }
            };
            *tag = Some(match &field.value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            });
        }

        record
    }

    pub fn level(&self) -> Option<Level> {
        self.level_name.parse().ok()
    }

    pub fn context_str(&self, key: &str) -> Option<&str> {
        self.context.get(key).and_then(Value::as_str)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
