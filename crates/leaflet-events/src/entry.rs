//! Log entries and their severities.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `strftime` pattern for entry timestamps (ISO-8601, UTC, whole seconds).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// How serious a logged event is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Normal operation.
    Info,
    /// Something degraded but the request was still served.
    Warning,
    /// An operation failed.
    Error,
}

impl Severity {
    /// The label written between the brackets of a log line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single event destined for the log sink.
///
/// Displays as `<timestamp> - [<SEVERITY>] <message>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// When the entry was created.
    pub timestamp: DateTime<Utc>,
    /// How serious the event is.
    pub severity: Severity,
    /// Free-form description.
    pub message: String,
}

impl LogEntry {
    /// Create an entry stamped with the current time.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            severity,
            message: message.into(),
        }
    }

    /// An [`Severity::Info`] entry stamped now.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    /// A [`Severity::Warning`] entry stamped now.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// An [`Severity::Error`] entry stamped now.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - [{}] {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.severity,
            self.message
        )
    }
}
