//! Destinations for formatted log entries.
//!
//! The consumer owns its sink exclusively, so implementations need `&mut
//! self` access only and no internal locking of their own.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::entry::{LogEntry, Severity};

/// Where the event logger writes entries.
pub trait LogSink: Send + 'static {
    /// Write one entry. Called once per entry, in queue order.
    fn write_entry(&mut self, entry: &LogEntry) -> io::Result<()>;

    /// Flush buffered output. Called whenever the queue runs empty.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogSink for Box<dyn LogSink> {
    fn write_entry(&mut self, entry: &LogEntry) -> io::Result<()> {
        (**self).write_entry(entry)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

// ---------------------------------------------------------------------------
// WriterSink
// ---------------------------------------------------------------------------

/// Writes one formatted line per entry to any [`Write`] implementation.
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: W,
}

impl<W: Write + Send + 'static> WriterSink<W> {
    /// Wrap an arbitrary writer.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Unwrap the sink, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl WriterSink<io::Stdout> {
    /// A sink writing to standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl WriterSink<io::Stderr> {
    /// A sink writing to standard error.
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl WriterSink<BufWriter<File>> {
    /// A sink appending to the file at `path`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be opened for appending.
    pub fn append_to(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write + Send + 'static> LogSink for WriterSink<W> {
    fn write_entry(&mut self, entry: &LogEntry) -> io::Result<()> {
        writeln!(self.writer, "{entry}")
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

// ---------------------------------------------------------------------------
// TracingSink
// ---------------------------------------------------------------------------

/// Forwards entries to `tracing` at the level matching their severity.
///
/// Useful when the process already ships its diagnostics somewhere and
/// the event stream should go along with them.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write_entry(&mut self, entry: &LogEntry) -> io::Result<()> {
        let timestamp = entry.timestamp.format(crate::entry::TIMESTAMP_FORMAT);
        match entry.severity {
            Severity::Info => {
                tracing::info!(target: "leaflet::events", %timestamp, "{}", entry.message);
            }
            Severity::Warning => {
                tracing::warn!(target: "leaflet::events", %timestamp, "{}", entry.message);
            }
            Severity::Error => {
                tracing::error!(target: "leaflet::events", %timestamp, "{}", entry.message);
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemorySink
// ---------------------------------------------------------------------------

/// Collects formatted lines in memory.
///
/// Clones share the same buffer, so a caller can keep one handle and give
/// the other to the logger.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of every line written so far.
    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl LogSink for MemorySink {
    fn write_entry(&mut self, entry: &LogEntry) -> io::Result<()> {
        self.lines
            .lock()
            .map_err(|e| io::Error::other(e.to_string()))?
            .push(entry.to_string());
        Ok(())
    }
}
