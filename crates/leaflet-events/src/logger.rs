//! The bounded producer/consumer log queue.
//!
//! Any number of producers share one [`EventLogger`] (usually behind an
//! [`Arc`]). Entries travel through a bounded [`tokio::sync::mpsc`]
//! channel to a single consumer running on a dedicated blocking thread,
//! which formats and writes them in the order the channel received them.
//! The channel is the only thing producers synchronize on.
//!
//! # Shutdown
//!
//! [`EventLogger::shutdown`] marks the logger as closing and sends the
//! consumer a stop signal. The consumer checks for it between entries,
//! never while a write is in progress. Once it sees the signal it:
//!
//! 1. keeps writing until every producer admitted before the signal has
//!    handed over its entry (including producers waiting for queue space),
//! 2. closes the channel,
//! 3. drains what is still buffered, flushes the sink, and returns.
//!
//! Producers arriving after the signal are refused with
//! [`LogError::Closed`] before they touch the queue.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::runtime::Handle;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Mutex, Notify, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::entry::{LogEntry, Severity};
use crate::error::LogError;
use crate::sink::LogSink;

/// Reference queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 50;

/// What the consumer did before it stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerReport {
    /// Entries the sink accepted.
    pub written: u64,
    /// Entries whose write failed. These are not retried.
    pub failed: u64,
}

/// Asynchronous, bounded, ordered event log.
///
/// Entries from a single producer are written in the order that producer
/// enqueued them. Entries from different producers interleave in whatever
/// order the queue received them.
#[derive(Debug)]
pub struct EventLogger {
    sender: mpsc::Sender<LogEntry>,
    admission: Arc<Admission>,
    /// `None` once shutdown has been requested.
    worker: Mutex<Option<Worker>>,
}

#[derive(Debug)]
struct Worker {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<WorkerReport>,
}

/// Tracks producers between "allowed in" and "entry handed over".
#[derive(Debug, Default)]
struct Admission {
    closing: AtomicBool,
    in_flight: AtomicUsize,
    /// Woken when the last in-flight producer leaves after closing.
    idle: Notify,
}

impl Admission {
    fn admit(&self) -> Result<Ticket<'_>, LogError> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let ticket = Ticket(self);
        if self.closing.load(Ordering::SeqCst) {
            return Err(LogError::Closed);
        }
        Ok(ticket)
    }
}

struct Ticket<'a>(&'a Admission);

impl Drop for Ticket<'_> {
    fn drop(&mut self) {
        let admission = self.0;
        if admission.in_flight.fetch_sub(1, Ordering::SeqCst) == 1
            && admission.closing.load(Ordering::SeqCst)
        {
            admission.idle.notify_one();
        }
    }
}

impl EventLogger {
    /// Create the queue and start the consumer.
    ///
    /// Must be called from within a Tokio runtime; the consumer runs on the
    /// runtime's blocking thread pool for the life of the logger.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::InvalidCapacity`] if `capacity` is zero, or
    /// [`LogError::NoRuntime`] if no Tokio runtime is available.
    pub fn start<S: LogSink>(capacity: usize, sink: S) -> Result<Self, LogError> {
        if capacity == 0 {
            return Err(LogError::InvalidCapacity(capacity));
        }
        let runtime = Handle::try_current().map_err(|e| LogError::NoRuntime(e.to_string()))?;

        let (tx, rx) = mpsc::channel(capacity);
        let (stop_tx, stop_rx) = oneshot::channel();
        let admission = Arc::new(Admission::default());

        let consumer = Consumer {
            sink,
            report: WorkerReport::default(),
        };
        let worker_admission = Arc::clone(&admission);
        let worker_runtime = runtime.clone();
        let handle = runtime.spawn_blocking(move || {
            consumer.run(&worker_runtime, rx, stop_rx, &worker_admission)
        });

        debug!(capacity, "Event logger started");

        Ok(Self {
            sender: tx,
            admission,
            worker: Mutex::new(Some(Worker {
                stop: stop_tx,
                handle,
            })),
        })
    }

    /// Append `entry` to the queue, waiting for space if it is full.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Closed`] if the logger has been shut down.
    pub async fn enqueue(&self, entry: LogEntry) -> Result<(), LogError> {
        let _ticket = self.admission.admit()?;
        if self.sender.send(entry).await.is_err() {
            return Err(LogError::Closed);
        }
        Ok(())
    }

    /// Append `entry` from a thread outside the async runtime, blocking the
    /// thread while the queue is full.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Closed`] if the logger has been shut down.
    ///
    /// # Panics
    ///
    /// Panics if called from within an asynchronous execution context while
    /// the logger is open.
    pub fn enqueue_blocking(&self, entry: LogEntry) -> Result<(), LogError> {
        let _ticket = self.admission.admit()?;
        if self.sender.blocking_send(entry).is_err() {
            return Err(LogError::Closed);
        }
        Ok(())
    }

    /// Append `entry` only if there is room right now.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::QueueFull`] if the queue is at capacity (the
    /// entry is discarded and the caller decides what to do), or
    /// [`LogError::Closed`] if the logger is shut down or shutting down.
    pub fn try_enqueue(&self, entry: LogEntry) -> Result<(), LogError> {
        let _ticket = self.admission.admit()?;
        match self.sender.try_send(entry) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(LogError::QueueFull),
            Err(TrySendError::Closed(_)) => Err(LogError::Closed),
        }
    }

    /// Enqueue a new entry with the given severity, stamped now.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Closed`] if the logger has been shut down.
    pub async fn log(
        &self,
        severity: Severity,
        message: impl Into<String>,
    ) -> Result<(), LogError> {
        self.enqueue(LogEntry::new(severity, message)).await
    }

    /// Enqueue an [`Severity::Info`] entry.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Closed`] if the logger has been shut down.
    pub async fn info(&self, message: impl Into<String>) -> Result<(), LogError> {
        self.log(Severity::Info, message).await
    }

    /// Enqueue a [`Severity::Warning`] entry.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Closed`] if the logger has been shut down.
    pub async fn warning(&self, message: impl Into<String>) -> Result<(), LogError> {
        self.log(Severity::Warning, message).await
    }

    /// Enqueue a [`Severity::Error`] entry.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Closed`] if the logger has been shut down.
    pub async fn error(&self, message: impl Into<String>) -> Result<(), LogError> {
        self.log(Severity::Error, message).await
    }

    /// Signal the consumer to stop, wait for it to drain, and join it.
    ///
    /// Every entry enqueued before this call is written before it returns.
    /// Producers blocked on a full queue when shutdown starts complete
    /// their send first and their entries are written too. Every enqueue
    /// that starts after this call returns [`LogError::Closed`].
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Closed`] if shutdown was already called, or
    /// [`LogError::Worker`] if the consumer panicked.
    pub async fn shutdown(&self) -> Result<WorkerReport, LogError> {
        let worker = self.worker.lock().await.take().ok_or(LogError::Closed)?;

        self.admission.closing.store(true, Ordering::SeqCst);
        // A consumer that already exited has dropped its receiver; joining
        // it below still yields its report.
        worker.stop.send(()).ok();

        let report = worker
            .handle
            .await
            .map_err(|e| LogError::Worker(e.to_string()))?;

        info!(
            written = report.written,
            failed = report.failed,
            "Event logger stopped"
        );
        Ok(report)
    }
}

/// The consumer side: owns the sink and counts outcomes.
struct Consumer<S> {
    sink: S,
    report: WorkerReport,
}

impl<S: LogSink> Consumer<S> {
    /// Consume until stopped, then drain. Runs on a blocking thread.
    fn run(
        mut self,
        runtime: &Handle,
        mut rx: mpsc::Receiver<LogEntry>,
        mut stop: oneshot::Receiver<()>,
        admission: &Admission,
    ) -> WorkerReport {
        runtime.block_on(async {
            loop {
                tokio::select! {
                    biased;
                    _ = &mut stop => break,
                    entry = rx.recv() => match entry {
                        Some(entry) => self.take(&entry, rx.is_empty()),
                        None => return,
                    },
                }
            }

            debug!("Shutdown signalled, draining event queue");
            loop {
                let idle = admission.idle.notified();
                if admission.in_flight.load(Ordering::SeqCst) == 0 {
                    break;
                }
                tokio::select! {
                    entry = rx.recv() => match entry {
                        Some(entry) => self.take(&entry, rx.is_empty()),
                        None => break,
                    },
                    () = idle => {}
                }
            }

            rx.close();
            while let Some(entry) = rx.recv().await {
                self.take(&entry, rx.is_empty());
            }
        });

        self.flush();
        self.report
    }

    fn take(&mut self, entry: &LogEntry, queue_empty: bool) {
        match self.sink.write_entry(entry) {
            Ok(()) => self.report.written = self.report.written.saturating_add(1),
            Err(e) => {
                self.report.failed = self.report.failed.saturating_add(1);
                warn!(error = %e, severity = %entry.severity, "Failed to write log entry");
            }
        }
        if queue_empty {
            self.flush();
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.sink.flush() {
            warn!(error = %e, "Failed to flush log sink");
        }
    }
}
