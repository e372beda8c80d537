//! Field normalization for the log-ingestion pipeline.
//!
//! | Raw key | Emitted as | Value |
//! |---|---|---|
//! | `level` | `severity` | unchanged (`"INFO"`, `"WARN"`, …) |
//! | `msg` | `message` | unchanged |
//! | `time` | `time` | UTC, RFC 3339, nanosecond precision, `Z` designator |
//!
//! Everything else passes through untouched.

use chrono::SecondsFormat;
use serde_json::Value;

use super::json::{Attr, AttrValue, FieldTransform, LEVEL_KEY, MESSAGE_KEY, TIME_KEY};

pub const SEVERITY_KEY: &str = "severity";
pub const NORMALIZED_MESSAGE_KEY: &str = "message";

/// The [`FieldTransform`] every request logger is built with.
#[derive(Clone, Copy, Debug, Default)]
pub struct FieldNormalizer;

impl FieldTransform for FieldNormalizer {
    fn transform(&self, mut attr: Attr) -> Attr {
        match attr.key.as_str() {
            LEVEL_KEY => attr.key = SEVERITY_KEY.to_owned(),
            MESSAGE_KEY => attr.key = NORMALIZED_MESSAGE_KEY.to_owned(),
            TIME_KEY => {
                // A caller attribute that happens to be named `time` but
                // carries no timestamp is left alone.
                if let AttrValue::Time(t) = attr.value {
                    let text = t.to_rfc3339_opts(SecondsFormat::Nanos, true);
                    attr.value = AttrValue::Json(Value::String(text));
                }
            }
            _ => {}
        }
        attr
    }
}
