//! Incremental, cursor-driven walk through a subreddit listing.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::FetchCache;
use crate::error::{Error, Result};
use crate::listing_page::ListingRequest;
use crate::models::{Listing, ListingResponse};

#[derive(Clone, Debug)]
pub enum PageState {
    Loaded(Arc<ListingResponse>),
    Failed(Arc<Error>),
}

/// One attempted page: the URL it was requested from and what came back.
#[derive(Clone, Debug)]
pub struct PageSlot {
    pub url: String,
    pub state: PageState,
}

impl PageSlot {
    pub fn response(&self) -> Option<&ListingResponse> {
        match &self.state {
            PageState::Loaded(response) => Some(&**response),
            PageState::Failed(_) => None,
        }
    }

    fn is_failed(&self) -> bool {
        matches!(self.state, PageState::Failed(_))
    }
}

/// Loads a listing one page at a time.
///
/// `size` counts the pages requested so far and starts at one, so the
/// first page is pending as soon as the pager exists. Requested pages are
/// loaded in order by [`ListingPager::fetch_requested`]; page `n` is only
/// requested from the cursor page `n - 1` returned. A failed page stops
/// progress until [`ListingPager::request_next_page`] retries it.
pub struct ListingPager {
    request: ListingRequest,
    origin: String,
    cache: FetchCache,
    pages: Vec<PageSlot>,
    size: usize,
    error: Option<Arc<Error>>,
}

impl ListingPager {
    /// Fails with [`Error::MissingSubreddit`] before anything is fetched.
    pub fn new(
        subreddit: &str,
        sort: &str,
        origin: impl Into<String>,
        cache: FetchCache,
    ) -> Result<Self> {
        let request = ListingRequest::new(subreddit, sort)?;
        Ok(Self {
            request,
            origin: origin.into(),
            cache,
            pages: Vec::new(),
            size: 1,
            error: None,
        })
    }

    pub fn request(&self) -> &ListingRequest {
        &self.request
    }

    /// Every record loaded so far, in page order.
    pub fn posts(&self) -> Vec<&Listing> {
        self.loaded_pages()
            .flat_map(|page| page.data.children.iter())
            .collect()
    }

    pub fn pages(&self) -> &[PageSlot] {
        &self.pages
    }

    pub fn error(&self) -> Option<&Arc<Error>> {
        self.error.as_ref()
    }

    /// Number of pages requested so far.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_loading_initial_data(&self) -> bool {
        self.loaded_count() == 0 && self.error.is_none()
    }

    /// A page past the first was requested and has not arrived. Stays
    /// true while that page sits failed in the error slot.
    pub fn is_loading_more(&self) -> bool {
        let loaded = self.loaded_count();
        loaded > 0 && loaded < self.size
    }

    /// The first page came back without records.
    pub fn is_empty(&self) -> bool {
        self.loaded_pages()
            .next()
            .is_some_and(|first| first.data.children.is_empty())
    }

    pub fn is_reaching_end(&self) -> bool {
        if self.is_empty() {
            return true;
        }
        self.loaded_pages()
            .last()
            .is_some_and(|last| last.data.after.is_none() || last.data.children.is_empty())
    }

    /// Asks for one more page, or for the failed page again.
    ///
    /// Returns `false` when the listing has already ended; nothing is
    /// requested then.
    pub fn request_next_page(&mut self) -> bool {
        if self.error.take().is_some() {
            if self.pages.last().is_some_and(PageSlot::is_failed) {
                self.pages.pop();
            }
            debug!(page = self.pages.len(), "retrying failed listing page");
            return true;
        }
        if self.is_reaching_end() {
            debug!(subreddit = self.request.subreddit(), "listing has no more pages");
            return false;
        }
        self.size += 1;
        true
    }

    /// Loads every requested page that has not arrived yet.
    ///
    /// Stops at the first failure, which is left in the error slot.
    pub async fn fetch_requested(&mut self) {
        while self.error.is_none() && self.pages.len() < self.size {
            let index = self.pages.len();
            let previous = self.pages.last().and_then(PageSlot::response);
            let Some(url) = self.request.page_key(&self.origin, index, previous) else {
                self.size = self.pages.len();
                break;
            };

            match self.cache.get(&url).await {
                Ok(response) => {
                    debug!(
                        page = index,
                        records = response.data.children.len(),
                        "listing page ready"
                    );
                    self.pages.push(PageSlot {
                        url,
                        state: PageState::Loaded(response),
                    });
                }
                Err(error) => {
                    warn!(page = index, url = %url, %error, "listing page failed");
                    self.pages.push(PageSlot {
                        url,
                        state: PageState::Failed(Arc::clone(&error)),
                    });
                    self.error = Some(error);
                }
            }
        }
    }

    /// Requests and loads one more page, returning how many records it
    /// added. Ending the listing adds none.
    pub async fn load_next_page(&mut self) -> std::result::Result<usize, Arc<Error>> {
        // A fresh pager already has its first page requested.
        let fresh = self.loaded_count() == 0 && self.error.is_none();
        if !fresh && !self.request_next_page() {
            return Ok(0);
        }

        let before = self.posts().len();
        self.fetch_requested().await;
        match &self.error {
            Some(error) => Err(Arc::clone(error)),
            None => Ok(self.posts().len() - before),
        }
    }

    /// Points the pager at another listing and starts over from its first
    /// page. Nothing loaded for the previous listing is kept, in the pager
    /// or in the cache; other pagers on that listing refetch it.
    pub fn switch_listing(&mut self, subreddit: &str, sort: &str) -> Result<()> {
        let request = ListingRequest::new(subreddit, sort)?;
        let evicted = self.cache.evict_prefix(&self.request.base_url(&self.origin));
        debug!(
            from = self.request.subreddit(),
            to = request.subreddit(),
            sort = request.sort(),
            evicted,
            "switching listing"
        );
        self.request = request;
        self.pages.clear();
        self.size = 1;
        self.error = None;
        Ok(())
    }

    fn loaded_pages(&self) -> impl Iterator<Item = &ListingResponse> {
        self.pages.iter().filter_map(PageSlot::response)
    }

    fn loaded_count(&self) -> usize {
        self.loaded_pages().count()
    }
}
