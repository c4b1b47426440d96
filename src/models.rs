//! Data models shared by the crawl stages.
//!
//! - [`LinkSet`]: ordered, deduplicated article URLs found on the category page
//! - [`Metadata`]: optional `<meta>` fields read from an article
//! - [`VideoRecord`]: one article whose markup contained an m3u8 manifest URL

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Article URLs in first-seen order.
///
/// Built from an iterator; duplicates are dropped by exact string
/// comparison, so the first occurrence of a URL decides its position.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LinkSet {
    urls: Vec<String>,
}

impl LinkSet {
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }
}

impl FromIterator<String> for LinkSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            urls: iter.into_iter().unique().collect(),
        }
    }
}

/// Metadata read from an article's `<meta>` tags.
///
/// Every field is independent. A missing tag leaves its field `None` and no
/// field is ever filled in from another one; substitutions happen only when
/// the feed item is built.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Raw `article:published_time`, usually ISO-8601 but not guaranteed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,
}

impl Metadata {
    /// `true` when no field was found.
    pub fn is_empty(&self) -> bool {
        *self == Metadata::default()
    }
}

/// An article page together with the manifest URL found in it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRecord {
    /// The article page the manifest was found on.
    pub page_url: String,
    /// The m3u8 manifest URL exactly as it appeared in the markup.
    pub manifest_url: String,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
    /// When the article was processed.
    pub discovered_at: DateTime<Utc>,
}

impl VideoRecord {
    pub fn new(page_url: String, manifest_url: String, metadata: Metadata) -> Self {
        Self {
            page_url,
            manifest_url,
            metadata,
            discovered_at: Utc::now(),
        }
    }
}
