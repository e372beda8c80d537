//! Structured request records.
//!
//! ```text
//! SequencedLogger ── stamps order_index
//!       │
//! JsonLogger ─────── default attrs, FieldTransform (FieldNormalizer)
//!       │
//! Sink ───────────── one JSON object per line
//! ```

mod json;
mod normalize;
mod sequenced;
mod sink;

pub use json::{Attr, AttrValue, FieldTransform, JsonLogger, LEVEL_KEY, MESSAGE_KEY, TIME_KEY};
pub use normalize::{FieldNormalizer, NORMALIZED_MESSAGE_KEY, SEVERITY_KEY};
pub use sequenced::{ORDER_INDEX_KEY, SequencedLogger};
pub use sink::{MemoryWriter, Sink};
