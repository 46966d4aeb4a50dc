use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the red-zone controller outside the feed layer.
#[derive(Error, Debug)]
pub enum RedzoneError {
    /// The config file exists but could not be read from disk.
    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A scoreboard date was not in `YYYYMMDD` form.
    #[error("Invalid scoreboard date (expected YYYYMMDD): {0}")]
    InvalidDate(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The browser process could not be started.
    #[error("Failed to launch browser {browser}: {source}")]
    Launch {
        browser: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The platform window backend reported a failure.
    #[error("Window backend error: {0}")]
    Window(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the red-zone crates.
pub type Result<T> = std::result::Result<T, RedzoneError>;
