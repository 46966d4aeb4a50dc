use thiserror::Error;

/// Errors raised while talking to the scoreboard or play-by-play feeds.
#[derive(Error, Debug)]
pub enum FeedError {
    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request failed before a response was received.
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// The scoreboard body was not valid JSON.
    #[error("Failed to decode scoreboard from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience alias used throughout the feed crate.
pub type Result<T> = std::result::Result<T, FeedError>;
