//! The text sink request records are written to.
//!
//! A [`Sink`] is a cheaply cloneable handle to one underlying writer. Every
//! record is written as one complete line while holding the sink's lock, so
//! lines from concurrent callers never interleave mid-record (their *order*
//! in the stream is whatever order they reached the lock in).

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

/// Shared, line-atomic text sink.
#[derive(Clone)]
pub struct Sink {
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Sink {
    /// Sink backed by the process's standard output.
    pub fn stdout() -> Self {
        Self::from_writer(io::stdout())
    }

    /// Sink backed by any writer: a file, a socket, a [`MemoryWriter`].
    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self { writer: Arc::new(Mutex::new(Box::new(writer))) }
    }

    /// Writes `line` followed by `\n`.
    ///
    /// Failures are swallowed: the record is dropped and a diagnostic is
    /// emitted through `tracing`. Nothing is retried or buffered.
    pub(crate) fn write_line(&self, line: &[u8]) {
        let mut writer = self.writer.lock();
        let res = writer
            .write_all(line)
            .and_then(|()| writer.write_all(b"\n"))
            .and_then(|()| writer.flush());
        if let Err(e) = res {
            warn!(error = %e, "dropped log record: sink write failed");
        }
    }
}

impl std::fmt::Debug for Sink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sink").finish_non_exhaustive()
    }
}

// ── MemoryWriter ──────────────────────────────────────────────────────────────

/// An in-memory writer whose clones all share one buffer.
///
/// Hand one clone to [`Sink::from_writer`] and keep another to read what was
/// written:
///
/// ```rust
/// use seqlog::{JsonLogger, Level, MemoryWriter, Sink};
///
/// let out = MemoryWriter::new();
/// let logger = JsonLogger::new(Sink::from_writer(out.clone()));
/// logger.log(Level::INFO, "hello", &[]);
/// assert_eq!(out.records()[0]["msg"], "hello");
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemoryWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock()).into_owned()
    }

    /// Written lines, without their terminators.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    /// Every line that parses as JSON, in write order.
    pub fn records(&self) -> Vec<serde_json::Value> {
        self.lines()
            .iter()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }
}

impl Write for MemoryWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.lock().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
