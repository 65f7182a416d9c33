//! Event log pipeline for Leaflet.
//!
//! Request handlers describe what happened as [`LogEntry`] values and hand
//! them to an [`EventLogger`]. The logger queues them in a bounded FIFO and
//! a single background consumer writes them, one line each, to a
//! [`LogSink`]. Producers never wait on sink I/O; they only wait when the
//! queue is full.
//!
//! # Architecture
//!
//! ```text
//! handler --enqueue--> [ bounded queue (50) ] --worker--> LogSink (stdout, file, tracing)
//! handler --enqueue--^
//! ```
//!
//! Every entry is written in the form
//! `2024-01-02T03:04:05Z - [INFO] Page saved successfully!`.
//!
//! # Lifecycle
//!
//! [`EventLogger::start`] spawns the consumer. [`EventLogger::shutdown`]
//! sends it a stop signal, waits for it to write everything already
//! queued, and joins it. Afterwards every enqueue is refused with
//! [`LogError::Closed`].

pub mod entry;
pub mod error;
pub mod logger;
pub mod sink;

// Re-export primary types for convenience.
pub use entry::{LogEntry, Severity, TIMESTAMP_FORMAT};
pub use error::LogError;
pub use logger::{DEFAULT_QUEUE_CAPACITY, EventLogger, WorkerReport};
pub use sink::{LogSink, MemorySink, TracingSink, WriterSink};
