use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::field::{Field as TracingField, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use crate::field::Field;
use crate::level::Level;
use crate::logger::LevelLogger;

/// `tracing_subscriber` layer that re-emits `tracing` events through a
/// [`LevelLogger`].
///
/// Libraries in the process (axum, tower-http, ...) log through `tracing`;
/// with this layer installed their events land in the same sink, in the same
/// line format, as direct facade calls. Each event's target is attached as a
/// `target` field and its other fields are kept as structured fields.
pub struct BridgeLayer {
    logger: LevelLogger,
    /// Events seen by the layer, before the level check.
    pub total_events: Arc<AtomicU64>,
    /// Events written through the logger.
    pub forwarded_events: Arc<AtomicU64>,
}

impl BridgeLayer {
    pub fn new(logger: LevelLogger) -> Self {
        Self {
            logger,
            total_events: Arc::new(AtomicU64::new(0)),
            forwarded_events: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl<S> Layer<S> for BridgeLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);

        let meta = event.metadata();
        let level = Level::from(*meta.level());
        if !self.logger.enabled(level) {
            return;
        }

        let mut fields = vec![Field::string("target", meta.target())];
        let mut message: Option<String> = None;
        let mut visitor = FieldVisitor { fields: &mut fields, message: &mut message };
        event.record(&mut visitor);

        let caller = match (meta.file(), meta.line()) {
            (Some(file), Some(line)) => format!("{}:{}", file, line),
            (Some(file), None) => file.to_string(),
            _ => meta.target().to_string(),
        };
        self.logger.log_at(level, &caller, message.as_deref().unwrap_or_default(), &fields);
        self.forwarded_events.fetch_add(1, Ordering::Relaxed);
    }
}

pub struct FieldVisitor<'a> {
    pub fields: &'a mut Vec<Field>,
    pub message: &'a mut Option<String>,
}

impl<'a> FieldVisitor<'a> {
    fn push(&mut self, field: &TracingField, value: Value) {
        self.fields.push(Field::new(field.name(), value));
    }
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &TracingField, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.push(field, Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &TracingField, value: i64) {
        self.push(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &TracingField, value: u64) {
        self.push(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &TracingField, value: f64) {
        self.push(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &TracingField, value: bool) {
        self.push(field, Value::from(value));
    }

    fn record_debug(&mut self, field: &TracingField, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.push(field, Value::String(format!("{:?}", value)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::LineFormat;
    use crate::parser::RecordParser;
    use crate::sink::BufferSink;
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn forwards_events_with_fields() {
        let sink = BufferSink::new();
        let logger = LevelLogger::new(Level::Info, LineFormat::Json, Arc::new(sink.clone()));
        let layer = BridgeLayer::new(logger);
        let total = Arc::clone(&layer.total_events);
        let forwarded = Arc::clone(&layer.forwarded_events);
        let subscriber = tracing_subscriber::registry().with(layer);

        let event_line = tracing::subscriber::with_default(subscriber, || {
            let line = line!() + 1;
            tracing::warn!(attempt = 2, peer = "db-1", "connection reset");
            tracing::debug!("filtered out");
            line
        });

        assert_eq!(total.load(Ordering::Relaxed), 2);
        assert_eq!(forwarded.load(Ordering::Relaxed), 1);

        let records = RecordParser::new(sink.contents().as_slice()).all_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level_name, "WARNING");
        assert_eq!(records[0].message, "connection reset");
        assert_eq!(records[0].context["attempt"], Value::from(2));
        assert_eq!(records[0].context_str("peer"), Some("db-1"));
        assert!(records[0].context_str("target").is_some());
        assert_eq!(records[0].caller, format!("{}:{}", file!(), event_line));
    }
}
