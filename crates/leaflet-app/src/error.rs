//! Error types for the Leaflet binary.
//!
//! [`AppError`] is the top-level error type that wraps all possible
//! failure modes during startup, serving, and shutdown.

/// Top-level error for the Leaflet binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: crate::config::ConfigError,
    },

    /// The page store could not be opened.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: leaflet_store::StoreError,
    },

    /// The event logger could not be started or stopped cleanly.
    #[error("event logger error: {source}")]
    Events {
        /// The underlying event logger error.
        #[from]
        source: leaflet_events::LogError,
    },

    /// The event sink could not be opened.
    #[error("event sink error: {message}")]
    Sink {
        /// Description of the sink failure.
        message: String,
    },

    /// Page templates failed to load.
    #[error("template error: {source}")]
    Templates {
        /// The underlying template error.
        #[from]
        source: leaflet_server::WikiError,
    },

    /// The HTTP server failed to bind or serve.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: leaflet_server::ServerError,
    },
}
