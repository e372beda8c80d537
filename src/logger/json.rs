//! The underlying structured logger.
//!
//! [`JsonLogger`] writes one JSON object per record to a [`Sink`]. Each
//! record starts with three built-in fields, keyed [`TIME_KEY`],
//! [`LEVEL_KEY`] and [`MESSAGE_KEY`], followed by the logger's default
//! attributes and then the call's own attributes, in that order.
//!
//! Every field, built-in or not, is passed through the logger's
//! [`FieldTransform`] (if one was installed) just before it is encoded. That
//! hook is how [`FieldNormalizer`](crate::FieldNormalizer) reshapes records
//! for the ingestion pipeline without any call site knowing about it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::{Level, warn};

use super::sink::Sink;

/// Key of the built-in timestamp field.
pub const TIME_KEY: &str = "time";
/// Key of the built-in level field.
pub const LEVEL_KEY: &str = "level";
/// Key of the built-in message field.
pub const MESSAGE_KEY: &str = "msg";

// ── Attributes ────────────────────────────────────────────────────────────────

/// The value half of an [`Attr`].
///
/// Built-in fields keep their native type until encoding so a transform can
/// still reformat them; everything a caller supplies is plain JSON.
#[derive(Clone, Debug, PartialEq)]
pub enum AttrValue {
    Json(Value),
    Level(Level),
    Time(DateTime<Utc>),
}

impl AttrValue {
    fn into_json(self) -> Value {
        match self {
            Self::Json(v) => v,
            Self::Level(level) => Value::String(level.to_string()),
            Self::Time(t) => Value::String(t.to_rfc3339()),
        }
    }
}

/// One key/value field of a record.
#[derive(Clone, Debug, PartialEq)]
pub struct Attr {
    pub key: String,
    pub value: AttrValue,
}

impl Attr {
    /// A caller attribute. Anything `serde_json` can turn into a [`Value`]
    /// works: strings, integers, booleans, or a prebuilt `json!` value.
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { key: key.into(), value: AttrValue::Json(value.into()) }
    }

    pub(crate) fn builtin(key: &str, value: AttrValue) -> Self {
        Self { key: key.to_owned(), value }
    }
}

// ── FieldTransform ────────────────────────────────────────────────────────────

/// A per-field rewrite applied to every record a logger emits.
///
/// Implemented for any `Fn(Attr) -> Attr`, so a closure works as well as a
/// named type.
pub trait FieldTransform: Send + Sync + 'static {
    fn transform(&self, attr: Attr) -> Attr;
}

impl<F> FieldTransform for F
where
    F: Fn(Attr) -> Attr + Send + Sync + 'static,
{
    fn transform(&self, attr: Attr) -> Attr {
        self(attr)
    }
}

// ── JsonLogger ────────────────────────────────────────────────────────────────

/// A JSON-lines structured logger.
///
/// Cloning is cheap and clones share the same sink. The logger does no level
/// filtering: every call produces exactly one line.
#[derive(Clone)]
pub struct JsonLogger {
    sink: Sink,
    attrs: Arc<[Attr]>,
    transform: Option<Arc<dyn FieldTransform>>,
}

impl JsonLogger {
    pub fn new(sink: Sink) -> Self {
        Self { sink, attrs: Arc::from(Vec::new()), transform: None }
    }

    /// Installs the transform every subsequent record is passed through.
    pub fn with_transform(mut self, transform: impl FieldTransform) -> Self {
        self.transform = Some(Arc::new(transform));
        self
    }

    /// Returns a logger that adds `attrs` to every record, after any default
    /// attributes this logger already carries. The original is untouched.
    pub fn with(&self, attrs: impl IntoIterator<Item = Attr>) -> Self {
        let merged: Vec<Attr> = self.attrs.iter().cloned().chain(attrs).collect();
        Self {
            sink: self.sink.clone(),
            attrs: merged.into(),
            transform: self.transform.clone(),
        }
    }

    /// Default attributes carried by this logger.
    pub fn attrs(&self) -> &[Attr] {
        &self.attrs
    }

    /// Emits one record.
    pub fn log(&self, level: Level, message: &str, attrs: &[Attr]) {
        self.emit(level, message, attrs.iter());
    }

    /// Encodes and writes one record. A later field with the same final key
    /// replaces the earlier value in place.
    pub(crate) fn emit<'a>(
        &self,
        level: Level,
        message: &str,
        attrs: impl Iterator<Item = &'a Attr>,
    ) {
        let builtins = [
            Attr::builtin(TIME_KEY, AttrValue::Time(Utc::now())),
            Attr::builtin(LEVEL_KEY, AttrValue::Level(level)),
            Attr::builtin(MESSAGE_KEY, AttrValue::Json(Value::String(message.to_owned()))),
        ];

        let mut record = Map::new();
        let fields = builtins
            .into_iter()
            .chain(self.attrs.iter().cloned())
            .chain(attrs.cloned());
        for field in fields {
            let field = match &self.transform {
                Some(t) => t.transform(field),
                None => field,
            };
            record.insert(field.key, field.value.into_json());
        }

        match serde_json::to_vec(&record) {
            Ok(line) => self.sink.write_line(&line),
            Err(e) => warn!(error = %e, "dropped log record: encoding failed"),
        }
    }
}

impl std::fmt::Debug for JsonLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLogger")
            .field("attrs", &self.attrs)
            .field("transform", &self.transform.is_some())
            .finish_non_exhaustive()
    }
}
