//! Projection of raw listing posts into display records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::config::{PLACEHOLDER_IMAGE_URL, REDDIT_PERMALINK_ORIGIN};
use crate::models::{Award, ImageRung, Listing, PostData};
use crate::relative_time::{from_epoch, from_now};

#[derive(Clone, Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisplayPost {
    pub id: String,
    pub title: String,
    pub src: String,
    pub author: String,
    pub ups: i64,
    pub awards: Vec<DisplayAward>,
    /// Relative to when the post was transformed, so not stable over time
    pub created_at: String,
    pub created_utc: f64,
    pub permalink: String,
    pub is_gallery: bool,
    pub gallery: Vec<String>,
}

#[derive(Clone, Serialize, Debug, PartialEq, Eq)]
pub struct DisplayAward {
    pub src: Option<String>,
    pub count: u64,
    pub description: String,
}

/// Why some of a post's media was replaced by the placeholder image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MediaFallback {
    /// The single-image preview ladder is absent or empty
    MissingPreview,
    /// A gallery post with no gallery entries at all
    MissingGalleryMetadata,
    /// Gallery positions whose ladder had no usable rung
    GallerySlots(Vec<usize>),
}

impl fmt::Display for MediaFallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaFallback::MissingPreview => write!(f, "missing preview resolutions"),
            MediaFallback::MissingGalleryMetadata => write!(f, "missing gallery metadata"),
            MediaFallback::GallerySlots(slots) => {
                write!(f, "unusable gallery items at {:?}", slots)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Transformed {
    pub post: DisplayPost,
    pub fallback: Option<MediaFallback>,
}

impl Transformed {
    /// Logs a media fallback, if any, and hands back the post.
    pub fn into_logged_post(self) -> DisplayPost {
        if let Some(fallback) = &self.fallback {
            warn!(post_id = %self.post.id, %fallback, "Error loading image");
        }
        self.post
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Rung {
    At(usize),
    Last,
}

impl Rung {
    fn choose(ladder: &[ImageRung], preferred: usize) -> Self {
        if preferred < ladder.len() {
            Rung::At(preferred)
        } else {
            Rung::Last
        }
    }

    fn pick(self, ladder: &[ImageRung]) -> Option<&ImageRung> {
        match self {
            Rung::At(index) => ladder.get(index),
            Rung::Last => ladder.last(),
        }
    }
}

pub fn transform_post(listing: &Listing, media_size_index: usize) -> Transformed {
    transform_post_at(listing, media_size_index, Utc::now())
}

/// Same as [`transform_post`] with `created_at` measured from `now`.
pub fn transform_post_at(
    listing: &Listing,
    media_size_index: usize,
    now: DateTime<Utc>,
) -> Transformed {
    let post = &listing.data;
    let is_gallery = post.is_gallery == Some(true);

    let (src, gallery, fallback) = if is_gallery {
        resolve_gallery(post, media_size_index)
    } else {
        let (src, fallback) = resolve_single(post, media_size_index);
        (src, Vec::new(), fallback)
    };

    let created_at = from_epoch(post.created_utc)
        .map(|created| from_now(created, now))
        .unwrap_or_default();

    Transformed {
        post: DisplayPost {
            id: post.id.clone(),
            title: post.title.clone(),
            src,
            author: post.author.clone(),
            ups: post.ups,
            awards: post.all_awardings.iter().map(display_award).collect(),
            created_at,
            created_utc: post.created_utc,
            permalink: format!("{}{}", REDDIT_PERMALINK_ORIGIN, post.permalink),
            is_gallery,
            gallery,
        },
        fallback,
    }
}

fn resolve_single(post: &PostData, media_size_index: usize) -> (String, Option<MediaFallback>) {
    let ladder = post
        .preview
        .as_ref()
        .and_then(|preview| preview.images.first())
        .map(|image| image.resolutions.as_slice())
        .unwrap_or_default();

    match Rung::choose(ladder, media_size_index).pick(ladder) {
        Some(rung) => (rung.url.clone(), None),
        None => (
            PLACEHOLDER_IMAGE_URL.to_string(),
            Some(MediaFallback::MissingPreview),
        ),
    }
}

/// The first gallery item decides the rung; every item is then read at
/// that rung so the gallery stays uniform.
fn resolve_gallery(
    post: &PostData,
    media_size_index: usize,
) -> (String, Vec<String>, Option<MediaFallback>) {
    let Some(first) = post.media_metadata.first() else {
        return (
            PLACEHOLDER_IMAGE_URL.to_string(),
            Vec::new(),
            Some(MediaFallback::MissingGalleryMetadata),
        );
    };

    let rung = Rung::choose(first.ladder.as_deref().unwrap_or_default(), media_size_index);

    let mut unusable = Vec::new();
    let gallery: Vec<String> = post
        .media_metadata
        .iter()
        .enumerate()
        .map(|(slot, item)| {
            match item.ladder.as_deref().and_then(|ladder| rung.pick(ladder)) {
                Some(chosen) => chosen.url.clone(),
                None => {
                    unusable.push(slot);
                    PLACEHOLDER_IMAGE_URL.to_string()
                }
            }
        })
        .collect();

    let src = gallery
        .first()
        .cloned()
        .unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_string());
    let fallback = (!unusable.is_empty()).then(|| MediaFallback::GallerySlots(unusable));
    (src, gallery, fallback)
}

fn display_award(award: &Award) -> DisplayAward {
    DisplayAward {
        src: award
            .resized_static_icons
            .first()
            .and_then(Option::as_ref)
            .map(|icon| icon.url.clone()),
        count: award.count,
        description: award.description.clone().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::models::ListingResponse;

    fn fixture_posts() -> Vec<Listing> {
        let mut filepath = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        filepath.push("src/resources/listing.json");

        let contents = fs::read_to_string(filepath)
            .expect("Should have been able to read the test resource file");

        let listing: ListingResponse = serde_json::from_str(&contents).unwrap();
        listing.data.children
    }

    fn listing(data: serde_json::Value) -> Listing {
        serde_json::from_value(json!({"kind": "t3", "data": data})).unwrap()
    }

    fn rungs(name: &str, count: usize) -> Vec<serde_json::Value> {
        (0..count)
            .map(|i| json!({"u": format!("https://preview.redd.it/{name}-{i}.jpg"), "x": 108 * (i + 1), "y": 100}))
            .collect()
    }

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_003_600, 0).unwrap()
    }

    #[test]
    fn single_image_uses_preferred_rung() {
        let posts = fixture_posts();
        let result = transform_post_at(&posts[0], 3, now());

        assert_eq!(result.fallback, None);
        assert_eq!(result.post.src, "https://preview.redd.it/cat.jpg?width=640");
        assert!(!result.post.is_gallery);
        assert!(result.post.gallery.is_empty());
    }

    #[test]
    fn single_image_falls_back_to_last_rung() {
        let posts = fixture_posts();
        let result = transform_post_at(&posts[0], 9, now());

        assert_eq!(result.fallback, None);
        assert_eq!(result.post.src, "https://preview.redd.it/cat.jpg?width=960");
    }

    #[test]
    fn missing_preview_yields_placeholder() {
        let posts = fixture_posts();
        let result = transform_post_at(&posts[2], 3, now());

        assert_eq!(result.post.src, PLACEHOLDER_IMAGE_URL);
        assert_eq!(result.fallback, Some(MediaFallback::MissingPreview));

        let empty_ladder = listing(json!({
            "id": "empty",
            "preview": {"images": [{"resolutions": []}]}
        }));
        let result = transform_post_at(&empty_ladder, 0, now());
        assert_eq!(result.post.src, PLACEHOLDER_IMAGE_URL);
        assert_eq!(result.fallback, Some(MediaFallback::MissingPreview));
    }

    #[test]
    fn gallery_reads_every_item_at_the_same_rung() {
        let posts = fixture_posts();
        let result = transform_post_at(&posts[1], 3, now());

        assert!(result.post.is_gallery);
        assert_eq!(result.fallback, None);
        assert_eq!(result.post.src, "https://preview.redd.it/zq9v1.jpg?width=640");
        assert_eq!(
            result.post.gallery,
            vec![
                "https://preview.redd.it/zq9v1.jpg?width=640",
                "https://preview.redd.it/ab3k2.jpg?width=640",
            ]
        );
    }

    #[test]
    fn gallery_falls_back_to_each_items_last_rung() {
        let post = listing(json!({
            "id": "g",
            "is_gallery": true,
            "media_metadata": {
                "first": {"p": rungs("first", 3)},
                "second": {"p": rungs("second", 2)}
            }
        }));

        let result = transform_post_at(&post, 3, now());
        assert_eq!(result.fallback, None);
        assert_eq!(result.post.src, "https://preview.redd.it/first-2.jpg");
        assert_eq!(
            result.post.gallery,
            vec![
                "https://preview.redd.it/first-2.jpg",
                "https://preview.redd.it/second-1.jpg",
            ]
        );
    }

    #[test]
    fn unusable_gallery_items_get_placeholder_slots() {
        let post = listing(json!({
            "id": "g",
            "is_gallery": true,
            "media_metadata": {
                "ok": {"p": rungs("ok", 5)},
                "short": {"p": rungs("short", 2)},
                "failed": {"status": "failed"}
            }
        }));

        let result = transform_post_at(&post, 3, now());
        assert_eq!(result.post.src, "https://preview.redd.it/ok-3.jpg");
        assert_eq!(
            result.post.gallery,
            vec![
                "https://preview.redd.it/ok-3.jpg".to_string(),
                PLACEHOLDER_IMAGE_URL.to_string(),
                PLACEHOLDER_IMAGE_URL.to_string(),
            ]
        );
        assert_eq!(result.fallback, Some(MediaFallback::GallerySlots(vec![1, 2])));
    }

    #[test]
    fn gallery_without_metadata_is_a_placeholder() {
        let post = listing(json!({"id": "g", "is_gallery": true, "media_metadata": null}));

        let result = transform_post_at(&post, 3, now());
        assert!(result.post.is_gallery);
        assert_eq!(result.post.src, PLACEHOLDER_IMAGE_URL);
        assert!(result.post.gallery.is_empty());
        assert_eq!(result.fallback, Some(MediaFallback::MissingGalleryMetadata));
    }

    #[test]
    fn gallery_metadata_is_ignored_unless_flagged() {
        let post = listing(json!({
            "id": "x",
            "is_gallery": false,
            "media_metadata": {"a": {"p": rungs("a", 4)}},
            "preview": {"images": [{"resolutions": [{"url": "https://i.redd.it/x.jpg", "width": 10, "height": 10}]}]}
        }));

        let result = transform_post_at(&post, 3, now());
        assert_eq!(result.post.src, "https://i.redd.it/x.jpg");
        assert!(result.post.gallery.is_empty());
    }

    #[test]
    fn awards_mirror_the_source_in_order() {
        let posts = fixture_posts();
        let result = transform_post_at(&posts[0], 3, now());

        assert_eq!(
            result.post.awards,
            vec![
                DisplayAward {
                    src: Some(
                        "https://www.redditstatic.com/gold/awards/icon/silver_16.png".to_string()
                    ),
                    count: 2,
                    description: "Shows the Silver Award... and that's it.".to_string(),
                },
                DisplayAward {
                    src: Some(
                        "https://i.redd.it/award_images/t5_22cerq/wholesome_16.png".to_string()
                    ),
                    count: 1,
                    description: "When you come across a feel-good thing.".to_string(),
                },
            ]
        );
    }

    #[test]
    fn awards_with_broken_icons_are_kept() {
        let post = listing(json!({
            "id": "awarded",
            "all_awardings": [
                {"count": 1, "description": "Helpful", "resized_static_icons": [{"url": "https://i.redd.it/helpful_16.png"}]},
                {"count": 4, "description": "No icon", "resized_static_icons": [{"width": 16, "height": 16}]}
            ]
        }));

        let awards = transform_post_at(&post, 3, now()).post.awards;
        assert_eq!(awards.len(), 2);
        assert_eq!(awards[0].src.as_deref(), Some("https://i.redd.it/helpful_16.png"));
        assert_eq!(
            awards[1],
            DisplayAward {
                src: None,
                count: 4,
                description: "No icon".to_string(),
            }
        );
    }

    #[test]
    fn text_fields_and_links_are_projected() {
        let posts = fixture_posts();
        let result = transform_post_at(&posts[0], 3, now());
        let post = result.post;

        assert_eq!(post.id, "1a2b3c");
        assert_eq!(post.title, "My cat discovered the heated blanket");
        assert_eq!(post.author, "warm_paws");
        assert_eq!(post.ups, 4821);
        assert_eq!(post.created_at, "an hour ago");
        assert_eq!(post.created_utc, 1_700_000_000.0);
        assert_eq!(
            post.permalink,
            "https://reddit.com/r/aww/comments/1a2b3c/my_cat_discovered_the_heated_blanket/"
        );
    }

    #[test]
    fn transforming_leaves_the_source_untouched() {
        let posts = fixture_posts();
        let before = posts[1].clone();
        let _ = transform_post_at(&posts[1], 0, now());
        assert_eq!(posts[1], before);
    }

    #[test]
    fn display_posts_serialize_in_camel_case() {
        let posts = fixture_posts();
        let value = serde_json::to_value(transform_post_at(&posts[1], 3, now()).post).unwrap();

        assert_eq!(value["isGallery"], json!(true));
        assert_eq!(value["createdAt"], json!("2 hours ago"));
        assert!(value.get("gallery").unwrap().as_array().unwrap().len() == 2);
    }

    #[test]
    fn logged_post_is_the_same_post() {
        let posts = fixture_posts();
        let result = transform_post_at(&posts[2], 3, now());
        let expected = result.post.clone();
        assert_eq!(result.into_logged_post(), expected);
    }
}
