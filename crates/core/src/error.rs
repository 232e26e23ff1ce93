use crate::config::ConfigError;
use crate::markup::SelectorError;

use thiserror::Error;

/// Result type alias for chatreel-core
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types.
///
/// Only loading and setup can fail; navigating a captured transcript cannot.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error for file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Selector compilation errors
    #[error("selector error: {0}")]
    Selector(#[from] SelectorError),

    /// Logging setup errors
    #[error("logging error: {0}")]
    Logging(String),
}
