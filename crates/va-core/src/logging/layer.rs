//! JSONL tracing layer.
//!
//! One JSON object per event on the configured writer (stderr in the CLI).
//! Correlation ids recorded on enclosing spans are copied onto each event.

use std::io::{self, Write};
use std::sync::Mutex;

use chrono::Utc;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use super::events::Level;

#[derive(Debug, Clone, Default)]
struct SpanContext {
    run_id: Option<String>,
    scan_id: Option<String>,
    stage: Option<String>,
}

struct SpanContextVisitor(SpanContext);

impl Visit for SpanContextVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.set(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.set(field, format!("{:?}", value));
    }
}

impl SpanContextVisitor {
    fn set(&mut self, field: &Field, value: String) {
        match field.name() {
            "run_id" => self.0.run_id = Some(value),
            "scan_id" => self.0.scan_id = Some(value),
            "stage" => self.0.stage = Some(value),
            _ => {}
        }
    }
}

struct JsonFieldVisitor {
    fields: serde_json::Map<String, serde_json::Value>,
    message: Option<String>,
}

impl JsonFieldVisitor {
    fn new() -> Self {
        JsonFieldVisitor {
            fields: serde_json::Map::new(),
            message: None,
        }
    }

    fn insert(&mut self, field: &Field, value: serde_json::Value) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl Visit for JsonFieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.insert(field, serde_json::Value::String(value.to_string()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value);
        if field.name() == "message" {
            self.message = Some(s);
        } else {
            self.insert(field, serde_json::Value::String(s));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, serde_json::Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, serde_json::Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        if let Some(n) = serde_json::Number::from_f64(value) {
            self.insert(field, serde_json::Value::Number(n));
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, serde_json::Value::Bool(value));
    }
}

/// JSONL tracing layer.
pub struct JsonlLayer<W = io::Stderr> {
    writer: Mutex<W>,
}

impl JsonlLayer<io::Stderr> {
    pub fn stderr() -> Self {
        JsonlLayer {
            writer: Mutex::new(io::stderr()),
        }
    }
}

impl<W: Write> JsonlLayer<W> {
    pub fn new(writer: W) -> Self {
        JsonlLayer {
            writer: Mutex::new(writer),
        }
    }
}

impl<S, W> Layer<S> for JsonlLayer<W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: Write + 'static,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut visitor = SpanContextVisitor(SpanContext::default());
        attrs.record(&mut visitor);
        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(visitor.0);
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut merged = SpanContext::default();
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope {
                if let Some(span_ctx) = span.extensions().get::<SpanContext>() {
                    if merged.run_id.is_none() {
                        merged.run_id.clone_from(&span_ctx.run_id);
                    }
                    if merged.scan_id.is_none() {
                        merged.scan_id.clone_from(&span_ctx.scan_id);
                    }
                    if merged.stage.is_none() {
                        merged.stage.clone_from(&span_ctx.stage);
                    }
                }
            }
        }

        let mut visitor = JsonFieldVisitor::new();
        event.record(&mut visitor);

        // Event-level ids win over span-level ones.
        for (key, slot) in [
            ("run_id", &mut merged.run_id),
            ("scan_id", &mut merged.scan_id),
            ("stage", &mut merged.stage),
        ] {
            match visitor.fields.remove(key) {
                Some(serde_json::Value::String(s)) if !s.is_empty() => *slot = Some(s),
                _ => {}
            }
        }

        let level: Level = (*event.metadata().level()).into();
        let mut obj = serde_json::Map::new();
        obj.insert("ts".into(), serde_json::json!(Utc::now().to_rfc3339()));
        obj.insert("level".into(), serde_json::json!(level));
        obj.insert("event".into(), serde_json::json!(event.metadata().target()));
        if let Some(id) = merged.run_id {
            obj.insert("run_id".into(), serde_json::json!(id));
        }
        if let Some(id) = merged.scan_id {
            obj.insert("scan_id".into(), serde_json::json!(id));
        }
        if let Some(stage) = merged.stage {
            obj.insert("stage".into(), serde_json::json!(stage));
        }
        if let Some(msg) = visitor.message {
            obj.insert("message".into(), serde_json::json!(msg));
        }
        if !visitor.fields.is_empty() {
            obj.insert("fields".into(), serde_json::Value::Object(visitor.fields));
        }

        let json = serde_json::Value::Object(obj).to_string();
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", json);
        }
    }
}
