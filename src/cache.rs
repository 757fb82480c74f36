//! Request-deduplicating page cache.
//!
//! Every listing page is keyed by its request URL. The first caller for a
//! key starts the fetch; anyone asking for the same key while it is in
//! flight awaits that same fetch, and a finished page is served from
//! memory afterwards. Failed fetches are evicted so a retry goes back to
//! the network.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use reqwest::Client;
use tracing::debug;

use crate::error::Error;
use crate::listing_page::fetch_listing_page;
use crate::models::ListingResponse;

pub type PageResult = Result<Arc<ListingResponse>, Arc<Error>>;

type SharedFetch = Shared<BoxFuture<'static, PageResult>>;

/// Cheap to clone; clones share one store.
#[derive(Clone)]
pub struct FetchCache {
    client: Client,
    entries: Arc<Mutex<HashMap<String, SharedFetch>>>,
}

impl FetchCache {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn get(&self, url: &str) -> PageResult {
        let fetch = {
            let mut entries = self.lock();
            match entries.get(url) {
                Some(existing) => {
                    debug!(url, "reusing cached listing request");
                    existing.clone()
                }
                None => {
                    let client = self.client.clone();
                    let key = url.to_string();
                    let fetch = async move {
                        fetch_listing_page(&client, &key)
                            .await
                            .map(Arc::new)
                            .map_err(Arc::new)
                    }
                    .boxed()
                    .shared();
                    entries.insert(url.to_string(), fetch.clone());
                    fetch
                }
            }
        };

        let result = fetch.clone().await;
        if result.is_err() {
            let mut entries = self.lock();
            if entries
                .get(url)
                .is_some_and(|current| current.ptr_eq(&fetch))
            {
                entries.remove(url);
            }
        }
        result
    }

    pub fn contains(&self, url: &str) -> bool {
        self.lock().contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drops every entry. Completed pages are otherwise kept for the life
    /// of the cache.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Drops entries whose URL starts with `prefix`, returning how many
    /// went. Pagers still holding those pages keep their copies.
    pub fn evict_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|url, _| !url.starts_with(prefix));
        before - entries.len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SharedFetch>> {
        // The map holds no invariant a panicking holder could break.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
