//! Error types for the listing feed.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A listing can only be built for a named subreddit.
    #[error("Subreddit is required")]
    MissingSubreddit,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Failed to parse listing: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl Error {
    /// Create an HTTP status error
    pub fn http_status(status: u16, url: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            url: url.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
