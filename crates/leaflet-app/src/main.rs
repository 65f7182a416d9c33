//! Leaflet binary: a small wiki served over HTTP.
//!
//! Wires the page store, the asynchronous event logger, and the HTTP
//! server together, then runs until Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `leaflet.yaml` (or `LEAFLET_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Open the page store
//! 4. Open the event sink and start the event logger
//! 5. Load page templates
//! 6. Bind the listener and serve until Ctrl-C
//! 7. Drain the event logger and report what it wrote

mod config;
mod error;

use std::path::Path;
use std::sync::Arc;

use leaflet_events::{EventLogger, LogEntry, LogSink, TracingSink, WriterSink};
use leaflet_server::{AppState, PageTemplates};
use leaflet_store::PageStore;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, EventsConfig, SinkKind};
use crate::error::AppError;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, startup, or serving fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. It supplies the default log filter, so it
    //    comes before the subscriber.
    let config = AppConfig::load()?;

    // 2. Initialize structured logging.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    if config.logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }

    info!(
        host = config.server.host,
        port = config.server.port,
        data_dir = config.storage.data_dir,
        queue_capacity = config.events.queue_capacity,
        sink = ?config.events.sink,
        "Configuration loaded"
    );

    // 3. Open the page store.
    let store = PageStore::open(&config.storage.data_dir).await?;
    info!(data_dir = %store.root().display(), "Page store opened");

    // 4. Start the event logger.
    let sink = open_sink(&config.events)?;
    let events = Arc::new(EventLogger::start(config.events.queue_capacity, sink)?);
    record(&events, LogEntry::info("App is starting...")).await;

    // 5-6. Serve. The logger is drained even if startup fails past this
    //      point, so nothing already queued is lost.
    let served = run(&config, store, &events).await;

    // 7. Drain the event logger.
    record(&events, LogEntry::warning("Tearing down server...")).await;
    let report = events.shutdown().await?;
    info!(
        written = report.written,
        failed = report.failed,
        "Event logger drained"
    );

    served?;
    info!("leaflet stopped");
    Ok(())
}

/// Load templates, bind, and serve until Ctrl-C.
async fn run(
    config: &AppConfig,
    store: PageStore,
    events: &Arc<EventLogger>,
) -> Result<(), AppError> {
    let templates = match &config.templates.dir {
        Some(dir) => {
            info!(dir, "Loading page templates");
            PageTemplates::from_dir(Path::new(dir))?
        }
        None => PageTemplates::builtin()?,
    };

    let state = Arc::new(AppState::new(store, Arc::clone(events), templates));
    let listener = leaflet_server::bind(&config.server.to_server_config()).await?;
    record(events, LogEntry::info("App is running...")).await;

    leaflet_server::serve(listener, state, shutdown_signal()).await?;
    Ok(())
}

/// Build the configured event sink.
fn open_sink(config: &EventsConfig) -> Result<Box<dyn LogSink>, AppError> {
    let sink: Box<dyn LogSink> = match config.sink {
        SinkKind::Stdout => Box::new(WriterSink::stdout()),
        SinkKind::Stderr => Box::new(WriterSink::stderr()),
        SinkKind::Tracing => Box::new(TracingSink),
        SinkKind::File => {
            let file = config.file.as_deref().ok_or_else(|| AppError::Sink {
                message: "events.file is not set".to_owned(),
            })?;
            let writer = WriterSink::append_to(Path::new(file)).map_err(|e| AppError::Sink {
                message: format!("cannot open {file}: {e}"),
            })?;
            info!(file, "Event log file opened");
            Box::new(writer)
        }
    };
    Ok(sink)
}

/// Enqueue a lifecycle event. A closed logger only costs the line.
async fn record(events: &EventLogger, entry: LogEntry) {
    if let Err(e) = events.enqueue(entry).await {
        warn!(error = %e, "Failed to record lifecycle event");
    }
}

/// Resolves on Ctrl-C.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "Cannot listen for Ctrl-C, serving until killed");
            std::future::pending::<()>().await;
        }
    }
}
