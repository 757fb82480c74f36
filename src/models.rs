use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct ListingResponse {
    #[serde(default)]
    pub kind: Option<String>,
    pub data: ListingData,
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<Listing>,
    #[serde(default)]
    pub after: Option<String>,
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct Listing {
    #[serde(default)]
    pub kind: Option<String>,
    pub data: PostData,
}

/// A post as the listing API returns it.
///
/// Media fields are decoded leniently: a malformed `preview` or
/// `media_metadata` becomes empty instead of failing the whole page, and
/// the transformer turns the gap into a placeholder.
#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct PostData {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub ups: i64,
    #[serde(default, deserialize_with = "lenient_each")]
    pub all_awardings: Vec<Award>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_gallery: Option<bool>,
    #[serde(default, deserialize_with = "media_items")]
    pub media_metadata: Vec<MediaItem>,
    #[serde(default, deserialize_with = "lenient")]
    pub preview: Option<Preview>,
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default)]
    pub permalink: String,
}

/// One variant in a resolution ladder. Previews spell the fields out,
/// gallery metadata abbreviates them to `u`, `x` and `y`.
#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct ImageRung {
    #[serde(alias = "u")]
    pub url: String,
    #[serde(default, alias = "x")]
    pub width: u32,
    #[serde(default, alias = "y")]
    pub height: u32,
}

#[derive(Clone, Deserialize, Debug, PartialEq, Default)]
pub struct Preview {
    #[serde(default)]
    pub images: Vec<PreviewImage>,
}

#[derive(Clone, Deserialize, Debug, PartialEq, Default)]
pub struct PreviewImage {
    #[serde(default)]
    pub resolutions: Vec<ImageRung>,
}

/// A gallery entry, in the order the metadata object lists it.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaItem {
    pub id: String,
    /// `None` when the entry carries no decodable `p` ladder
    pub ladder: Option<Vec<ImageRung>>,
}

/// Fields decode one by one, so a bad icon or count never drops the award.
#[derive(Clone, Deserialize, Debug, PartialEq, Default)]
pub struct Award {
    /// `None` marks an icon entry that could not be decoded
    #[serde(default, deserialize_with = "lenient_each")]
    pub resized_static_icons: Vec<Option<ImageRung>>,
    #[serde(default, deserialize_with = "lenient")]
    pub count: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
}

#[derive(Deserialize)]
struct MediaMetadataEntry {
    p: Vec<ImageRung>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Decodes a list entry by entry; entries that fail become `T::default()`
/// so the list keeps its source length. A non-list decodes as empty.
fn lenient_each<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let entries: Vec<Value> = lenient(deserializer)?;
    Ok(entries
        .into_iter()
        .map(|entry| serde_json::from_value(entry).unwrap_or_default())
        .collect())
}

fn media_items<'de, D>(deserializer: D) -> Result<Vec<MediaItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries: Option<Map<String, Value>> = lenient(deserializer)?;
    Ok(entries
        .unwrap_or_default()
        .into_iter()
        .map(|(id, value)| MediaItem {
            id,
            ladder: serde_json::from_value::<MediaMetadataEntry>(value)
                .ok()
                .map(|entry| entry.p),
        })
        .collect())
}
