//! Article metadata from `<meta>` tags.

use crate::models::Metadata;
use scraper::{Html, Selector};
use tracing::debug;

/// The `<meta>` keys read from an article, matched against either the
/// `property` or the `name` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetaField {
    Title,
    Description,
    PublishedTime,
    ModifiedTime,
    ImageUrl,
    ImageWidth,
    ImageHeight,
    Author,
    CanonicalUrl,
}

const FIELDS: [MetaField; 9] = [
    MetaField::Title,
    MetaField::Description,
    MetaField::PublishedTime,
    MetaField::ModifiedTime,
    MetaField::ImageUrl,
    MetaField::ImageWidth,
    MetaField::ImageHeight,
    MetaField::Author,
    MetaField::CanonicalUrl,
];

impl MetaField {
    fn keys(self) -> &'static [&'static str] {
        match self {
            MetaField::Title => &["og:title"],
            MetaField::Description => &["og:description"],
            MetaField::PublishedTime => &["article:published_time"],
            MetaField::ModifiedTime => &["article:modified_time"],
            MetaField::ImageUrl => &["og:image"],
            MetaField::ImageWidth => &["og:image:width"],
            MetaField::ImageHeight => &["og:image:height"],
            MetaField::Author => &["author", "article:author"],
            MetaField::CanonicalUrl => &["og:url"],
        }
    }

    fn apply(self, meta: &mut Metadata, value: String) {
        match self {
            MetaField::Title => meta.title = Some(value),
            MetaField::Description => meta.description = Some(value),
            MetaField::PublishedTime => meta.published_time = Some(value),
            MetaField::ModifiedTime => meta.modified_time = Some(value),
            MetaField::ImageUrl => meta.image_url = Some(value),
            MetaField::ImageWidth => meta.image_width = parse_dimension(&value),
            MetaField::ImageHeight => meta.image_height = parse_dimension(&value),
            MetaField::Author => meta.author = Some(value),
            MetaField::CanonicalUrl => meta.canonical_url = Some(value),
        }
    }
}

fn parse_dimension(value: &str) -> Option<u32> {
    match value.parse() {
        Ok(n) => Some(n),
        Err(_) => {
            debug!(value, "Ignoring non-numeric image dimension");
            None
        }
    }
}

/// Read the first non-empty `content` of a `<meta>` tag keyed by `key`.
fn meta_content(document: &Html, key: &str) -> Option<String> {
    let selector =
        Selector::parse(&format!(r#"meta[property="{key}"], meta[name="{key}"]"#)).ok()?;
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("content"))
        .map(str::trim)
        .find(|content| !content.is_empty())
        .map(str::to_string)
}

/// Collect every known metadata field present in `document`.
///
/// Missing or empty tags are left as `None`; this never fails.
pub fn extract_metadata(document: &Html) -> Metadata {
    let mut meta = Metadata::default();
    for field in FIELDS {
        if let Some(value) = field.keys().iter().find_map(|key| meta_content(document, key)) {
            field.apply(&mut meta, value);
        }
    }
    meta
}
