//! Logging setup on the tracing ecosystem.
//!
//! # Environment Variables
//!
//! - `CHATREEL_LOG`: Filter directive (like `RUST_LOG`), e.g., `chatreel_core=debug`
//! - `CHATREEL_LOG_FORMAT`: Output format for stderr: `pretty`, `json`, `compact`
//! - `CHATREEL_LOG_DIR`: Directory for the rolling log file (default `~/.chatreel/logs/`)
//!
//! # Configuration
//!
//! Logging is configured via the `[logging]` section in `chatreel.toml`:
//!
//! ```toml
//! [logging]
//! level = "warn"
//! format = "pretty"
//!
//! [logging.file]
//! enabled = false
//! level = "debug"
//! ```
//!
//! # Example
//!
//! ```no_run
//! use chatreel_core::logging;
//! use chatreel_core::logging::LoggingConfig;
//!
//! // Keep the guard alive so buffered file output is flushed on exit
//! let _guard = logging::init_logging(Some(LoggingConfig::default().with_stderr(false)))?;
//! # Ok::<(), chatreel_core::Error>(())
//! ```

use crate::Error;
use crate::config::{FileLoggingConfig, LoggingConfig as ConfigLoggingConfig};
use std::env;
use std::io;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log output format for stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Pretty, human-readable output with colors (default for TTY)
    #[default]
    Pretty,
    /// JSON output (one line per event)
    Json,
    /// Compact, single-line output
    Compact,
}

impl LogFormat {
    /// All available log formats.
    pub const VALUES: &[LogFormat] = &[LogFormat::Pretty, LogFormat::Json, LogFormat::Compact];

    /// Parse a log format from a string.
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Some(LogFormat::Pretty),
            "json" => Some(LogFormat::Json),
            "compact" => Some(LogFormat::Compact),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
            LogFormat::Compact => "compact",
        }
    }
}

/// Runtime logging settings, built from the `[logging]` config section.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default filter directive.
    pub level: String,
    /// Output format for stderr.
    pub format: LogFormat,
    /// File logging configuration (optional).
    pub file: Option<FileLoggingConfig>,
    /// Write events to stderr. The terminal player turns this off while it
    /// owns the screen.
    pub stderr: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "warn".to_string(), format: LogFormat::default(), file: None, stderr: true }
    }
}

impl From<ConfigLoggingConfig> for LoggingConfig {
    fn from(config: ConfigLoggingConfig) -> Self {
        let format = LogFormat::parse_str(&config.format).unwrap_or_default();

        Self {
            level: config.level,
            format,
            file: if config.file.enabled { Some(config.file) } else { None },
            stderr: true,
        }
    }
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_file_logging(mut self, config: FileLoggingConfig) -> Self {
        self.file = Some(config);
        self
    }

    pub fn with_stderr(mut self, stderr: bool) -> Self {
        self.stderr = stderr;
        self
    }

    /// Filter directive from `CHATREEL_LOG`, then `RUST_LOG`, then the config level.
    fn filter_directive(&self) -> String {
        env::var("CHATREEL_LOG")
            .ok()
            .or_else(|| env::var("RUST_LOG").ok())
            .unwrap_or_else(|| self.level.clone())
    }

    /// Detect if stderr is a TTY for pretty formatting.
    fn is_tty() -> bool {
        atty::is(atty::Stream::Stderr)
    }

    /// Determine the format for stderr output.
    ///
    /// `CHATREEL_LOG_FORMAT` wins; otherwise the configured format is kept
    /// on a terminal and pretty output is downgraded to compact when piped.
    fn detect_format(&self) -> LogFormat {
        if let Ok(fmt_str) = env::var("CHATREEL_LOG_FORMAT")
            && let Some(fmt) = LogFormat::parse_str(&fmt_str)
        {
            return fmt;
        }

        match self.format {
            LogFormat::Pretty if !Self::is_tty() => LogFormat::Compact,
            format => format,
        }
    }

    /// Get the log directory path.
    pub fn log_dir() -> Result<PathBuf, Error> {
        if let Ok(custom_dir) = env::var("CHATREEL_LOG_DIR") {
            return Ok(PathBuf::from(custom_dir));
        }

        let home = env::var("HOME")
            .or_else(|_| env::var("USERPROFILE"))
            .map_err(|_| Error::Logging("could not determine home directory".to_string()))?;

        Ok(PathBuf::from(home).join(".chatreel").join("logs"))
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn stderr_layer(format: LogFormat, filter: EnvFilter) -> BoxedLayer {
    match format {
        LogFormat::Pretty => fmt::layer().pretty().with_writer(io::stderr).with_ansi(true).with_filter(filter).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(io::stderr).with_filter(filter).boxed(),
        LogFormat::Compact => fmt::layer().compact().with_writer(io::stderr).with_filter(filter).boxed(),
    }
}

/// Initialize the global tracing subscriber.
///
/// Sets up an env-based filter, formatted stderr output (unless disabled)
/// and, when file logging is enabled, a daily-rolling JSON log. The returned
/// guard flushes the file writer when dropped; hold it for the life of the
/// process.
pub fn init_logging(config: Option<LoggingConfig>) -> Result<Option<WorkerGuard>, Error> {
    let config = config.unwrap_or_default();
    let mut layers: Vec<BoxedLayer> = Vec::new();

    if config.stderr {
        let filter = EnvFilter::new(config.filter_directive());
        layers.push(stderr_layer(config.detect_format(), filter));
    }

    let mut guard = None;
    if let Some(file_config) = &config.file {
        let log_dir = LoggingConfig::log_dir()?;
        std::fs::create_dir_all(&log_dir)
            .map_err(|e| Error::Logging(format!("failed to create log directory: {}", e)))?;

        let file_appender = tracing_appender::rolling::daily(&log_dir, "chatreel.log");
        let (non_blocking, worker_guard) = tracing_appender::non_blocking(file_appender);
        let filter = EnvFilter::new(&file_config.level);
        layers.push(fmt::layer().json().with_writer(non_blocking).with_filter(filter).boxed());
        guard = Some(worker_guard);
    }

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|e| Error::Logging(format!("failed to install subscriber: {}", e)))?;

    Ok(guard)
}

/// Sanitize file paths for logging (replace the home directory with `~`).
pub fn sanitize_path(path: &std::path::Path) -> String {
    if let Ok(home) = env::var("HOME")
        && !home.is_empty()
        && let Ok(stripped) = path.strip_prefix(&home)
    {
        return format!("~/{}", stripped.display());
    }

    path.display().to_string()
}
