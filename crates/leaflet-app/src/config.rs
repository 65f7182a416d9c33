//! Configuration loading and typed config structures for Leaflet.
//!
//! The configuration lives in `leaflet.yaml` in the working directory (or
//! the file named by `LEAFLET_CONFIG`). Every field has a default, so the
//! file is optional and may list only what it changes. Environment
//! variables override the file:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `LEAFLET_HOST` | `server.host` |
//! | `LEAFLET_PORT` | `server.port` |
//! | `LEAFLET_DATA_DIR` | `storage.data_dir` |
//! | `LEAFLET_TEMPLATES_DIR` | `templates.dir` |
//! | `LEAFLET_EVENT_SINK` | `events.sink` |
//! | `LEAFLET_EVENT_FILE` | `events.file` |

use std::path::{Path, PathBuf};

use leaflet_events::DEFAULT_QUEUE_CAPACITY;
use leaflet_server::ServerConfig;
use serde::Deserialize;

/// Config file used when `LEAFLET_CONFIG` is not set.
pub const DEFAULT_CONFIG_FILE: &str = "leaflet.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        #[from]
        source: serde_yml::Error,
    },

    /// A value parsed but is not usable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Where pages are stored.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Page template location.
    #[serde(default)]
    pub templates: TemplatesConfig,

    /// Event logger settings.
    #[serde(default)]
    pub events: EventsConfig,

    /// Diagnostic logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load the configuration the binary runs with.
    ///
    /// Reads `LEAFLET_CONFIG` (or [`DEFAULT_CONFIG_FILE`]) if it exists,
    /// falls back to defaults otherwise, then applies environment
    /// overrides and validates the result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, an
    /// override cannot be parsed, or validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("LEAFLET_CONFIG")
            .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from);

        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string. An empty document yields
    /// the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply overrides looked up by variable name (see the module table).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `LEAFLET_PORT` or
    /// `LEAFLET_EVENT_SINK` cannot be parsed.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("LEAFLET_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("LEAFLET_PORT") {
            self.server.port = port
                .parse()
                .map_err(|e| ConfigError::Invalid(format!("invalid LEAFLET_PORT {port:?}: {e}")))?;
        }
        if let Some(dir) = lookup("LEAFLET_DATA_DIR") {
            self.storage.data_dir = dir;
        }
        if let Some(dir) = lookup("LEAFLET_TEMPLATES_DIR") {
            self.templates.dir = Some(dir);
        }
        if let Some(sink) = lookup("LEAFLET_EVENT_SINK") {
            self.events.sink = SinkKind::parse(&sink)?;
        }
        if let Some(file) = lookup("LEAFLET_EVENT_FILE") {
            self.events.file = Some(file);
        }
        Ok(())
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the queue capacity is zero or a
    /// file sink has no file.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.events.queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "events.queue_capacity must be at least 1".to_owned(),
            ));
        }
        if self.events.sink == SinkKind::File && self.events.file.is_none() {
            return Err(ConfigError::Invalid(
                "events.sink is `file` but events.file is not set".to_owned(),
            ));
        }
        Ok(())
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerSection {
    /// The listener configuration for `leaflet-server`.
    pub fn to_server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
        }
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Page storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one `<title>.txt` file per page.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Page template settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TemplatesConfig {
    /// Directory containing `view.html` and `edit.html`. Built-in
    /// templates are used when unset.
    #[serde(default)]
    pub dir: Option<String>,
}

/// Event logger settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventsConfig {
    /// Maximum queued entries before producers wait.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Where entries are written.
    #[serde(default)]
    pub sink: SinkKind,

    /// Log file path, required when `sink` is `file`.
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            sink: SinkKind::default(),
            file: None,
        }
    }
}

/// Destination for event log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Standard output.
    #[default]
    Stdout,
    /// Standard error.
    Stderr,
    /// The `tracing` subscriber.
    Tracing,
    /// An append-only file (`events.file`).
    File,
}

impl SinkKind {
    /// Parse a sink name as written in YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for unknown names.
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        match name.to_lowercase().as_str() {
            "stdout" => Ok(Self::Stdout),
            "stderr" => Ok(Self::Stderr),
            "tracing" => Ok(Self::Tracing),
            "file" => Ok(Self::File),
            other => Err(ConfigError::Invalid(format!("unknown event sink: {other}"))),
        }
    }
}

/// Diagnostic logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit diagnostics as JSON lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8080
}

fn default_data_dir() -> String {
    ".".to_owned()
}

const fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_log_level() -> String {
    "info".to_owned()
}
