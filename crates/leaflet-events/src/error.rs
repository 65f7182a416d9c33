//! Error types for the event logger.

/// Errors returned by [`EventLogger`](crate::EventLogger) operations.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// The queue must hold at least one entry.
    #[error("queue capacity must be at least 1, got {0}")]
    InvalidCapacity(usize),

    /// The logger was started outside a Tokio runtime.
    #[error("event logger needs a Tokio runtime: {0}")]
    NoRuntime(String),

    /// The logger has been shut down and accepts no more entries.
    #[error("event logger is shut down")]
    Closed,

    /// The queue is at capacity (only returned by non-blocking enqueue).
    #[error("event queue is full")]
    QueueFull,

    /// The consumer task panicked or was cancelled.
    #[error("event logger worker failed: {0}")]
    Worker(String),
}
