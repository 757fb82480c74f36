//! Paginated subreddit listings shaped into display records.
//!
//! A [`ListingPager`] walks a listing page by page through a shared
//! [`FetchCache`]; [`transform_post`] turns each raw post into a
//! [`DisplayPost`] with a resolved image, gallery and awards.

pub mod cache;
pub mod config;
pub mod error;
pub mod listing_page;
pub mod models;
pub mod pager;
pub mod relative_time;
pub mod transform;

pub use cache::FetchCache;
pub use config::FeedConfig;
pub use error::{Error, Result};
pub use listing_page::ListingRequest;
pub use models::{Listing, ListingResponse};
pub use pager::ListingPager;
pub use transform::{transform_post, transform_post_at, DisplayPost, MediaFallback, Transformed};
