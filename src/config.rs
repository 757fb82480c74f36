use reqwest::Client;

use crate::error::Result;

/// Number of records requested per listing page.
pub const PAGE_LIMIT: u32 = 12;

pub const DEFAULT_SORT: &str = "hot";

/// Rung of the resolution ladder preferred when transforming a post.
pub const DEFAULT_MEDIA_SIZE_INDEX: usize = 3;

pub const REDDIT_API_ORIGIN: &str = "https://www.reddit.com";

/// Origin prefixed to a post's relative permalink.
pub const REDDIT_PERMALINK_ORIGIN: &str = "https://reddit.com";

/// Shown in place of a post's image when its resolution ladder is unusable.
pub const PLACEHOLDER_IMAGE_URL: &str =
    "https://via.placeholder.com/275?text=Error%20loading%20image";

#[derive(Clone, Debug, PartialEq)]
pub struct FeedConfig {
    /// Origin listings are fetched from
    pub api_origin: String,
    pub media_size_index: usize,
    pub user_agent: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            api_origin: REDDIT_API_ORIGIN.to_string(),
            media_size_index: DEFAULT_MEDIA_SIZE_INDEX,
            user_agent: format!("subfeed/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl FeedConfig {
    /// Point listing requests at another origin, e.g. a mock server.
    pub fn with_api_origin(mut self, origin: impl Into<String>) -> Self {
        self.api_origin = origin.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_media_size_index(mut self, index: usize) -> Self {
        self.media_size_index = index;
        self
    }

    pub fn http_client(&self) -> Result<Client> {
        let client = Client::builder().user_agent(&self.user_agent).build()?;
        Ok(client)
    }
}
