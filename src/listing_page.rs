use reqwest::Client;
use tracing::debug;

use crate::config::{DEFAULT_SORT, PAGE_LIMIT};
use crate::error::{Error, Result};
use crate::models::ListingResponse;

/// The subreddit and sort order a pager walks through.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingRequest {
    subreddit: String,
    sort: String,
}

impl ListingRequest {
    /// Fails with [`Error::MissingSubreddit`] when `subreddit` is blank.
    /// An empty `sort` falls back to `hot`.
    pub fn new(subreddit: &str, sort: &str) -> Result<Self> {
        let subreddit = subreddit.trim();
        if subreddit.is_empty() {
            return Err(Error::MissingSubreddit);
        }
        let sort = match sort.trim() {
            "" => DEFAULT_SORT,
            sort => sort,
        };
        Ok(Self {
            subreddit: subreddit.to_string(),
            sort: sort.to_string(),
        })
    }

    pub fn subreddit(&self) -> &str {
        &self.subreddit
    }

    pub fn sort(&self) -> &str {
        &self.sort
    }

    pub fn base_url(&self, origin: &str) -> String {
        format!("{}/r/{}/{}.json?raw_json=1", origin, self.subreddit, self.sort)
    }

    /// URL of page `index`, given the page loaded before it.
    ///
    /// Returns `None` once the previous page ends the listing, either by
    /// carrying no `after` cursor or by carrying no records. Any page past
    /// the first needs its predecessor.
    pub fn page_key(
        &self,
        origin: &str,
        index: usize,
        previous: Option<&ListingResponse>,
    ) -> Option<String> {
        let base = self.base_url(origin);
        if index == 0 {
            return Some(format!("{}&limit={}", base, PAGE_LIMIT));
        }

        let previous = previous?;
        if previous.data.children.is_empty() {
            return None;
        }
        let after = previous.data.after.as_deref()?;
        Some(format!("{}&after={}&limit={}", base, after, PAGE_LIMIT))
    }
}

pub async fn fetch_listing_page(client: &Client, url: &str) -> Result<ListingResponse> {
    debug!(url, "fetching listing page");
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::http_status(status.as_u16(), url));
    }

    let body = response.text().await?;
    let listing: ListingResponse = serde_json::from_str(&body)?;
    debug!(
        url,
        records = listing.data.children.len(),
        after = listing.data.after.as_deref().unwrap_or(""),
        "listing page loaded"
    );
    Ok(listing)
}
