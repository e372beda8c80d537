//! Order-indexed logging.
//!
//! Log lines from one request can reach the sink out of order: handlers fan
//! work out to tasks and threads, and a sink is free to interleave writers.
//! [`SequencedLogger`] stamps every record with an `order_index` taken from a
//! request-local counter so the ingestion side can restore call order.
//!
//! # Two stamping disciplines
//!
//! | Entry point | Stamped value | Sequential calls emit |
//! |---|---|---|
//! | [`log`](SequencedLogger::log) | counter *after* increment | `1, 2, 3, …` |
//! | [`debug`](SequencedLogger::debug) / [`info`](SequencedLogger::info) / [`warn`](SequencedLogger::warn) / [`error`](SequencedLogger::error) | counter *before* increment | `0, 1, 2, …` |
//!
//! Both read and advance the counter under one lock acquisition, so records
//! emitted through the same discipline never share an index, however many
//! threads call in. Mixing the two disciplines on one logger can repeat a
//! value (`info` after `log` re-stamps the value `log` just emitted). The
//! lock is released before the record is encoded and written.

use std::iter;

use parking_lot::Mutex;
use tracing::Level;

use super::json::{Attr, JsonLogger};

/// Key of the stamped sequence number.
pub const ORDER_INDEX_KEY: &str = "order_index";

/// A [`JsonLogger`] that stamps each record with a strictly increasing
/// `order_index`.
///
/// Share it between tasks behind an `Arc`; all methods take `&self`.
#[derive(Debug)]
pub struct SequencedLogger {
    logger: JsonLogger,
    counter: Mutex<u64>,
}

impl SequencedLogger {
    /// Wraps `logger` with a counter starting at 0.
    pub fn new(logger: JsonLogger) -> Self {
        Self { logger, counter: Mutex::new(0) }
    }

    /// The wrapped logger. Records written through it directly carry no
    /// `order_index`.
    pub fn inner(&self) -> &JsonLogger {
        &self.logger
    }

    /// Current counter value.
    pub fn counter(&self) -> u64 {
        *self.counter.lock()
    }

    /// Emits a record at `level`, stamped with the post-increment counter.
    pub fn log(&self, level: Level, message: &str, attrs: &[Attr]) {
        let index = {
            let mut counter = self.counter.lock();
            *counter += 1;
            *counter
        };
        self.emit(level, message, attrs, index);
    }

    pub fn debug(&self, message: &str, attrs: &[Attr]) {
        self.log_pre_increment(Level::DEBUG, message, attrs);
    }

    pub fn info(&self, message: &str, attrs: &[Attr]) {
        self.log_pre_increment(Level::INFO, message, attrs);
    }

    pub fn warn(&self, message: &str, attrs: &[Attr]) {
        self.log_pre_increment(Level::WARN, message, attrs);
    }

    pub fn error(&self, message: &str, attrs: &[Attr]) {
        self.log_pre_increment(Level::ERROR, message, attrs);
    }

    fn log_pre_increment(&self, level: Level, message: &str, attrs: &[Attr]) {
        let index = {
            let mut counter = self.counter.lock();
            let current = *counter;
            *counter += 1;
            current
        };
        self.emit(level, message, attrs, index);
    }

    fn emit(&self, level: Level, message: &str, attrs: &[Attr], index: u64) {
        let stamp = Attr::new(ORDER_INDEX_KEY, index);
        self.logger.emit(level, message, attrs.iter().chain(iter::once(&stamp)));
    }
}
