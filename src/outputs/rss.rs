//! RSS 2.0 feed generation.
//!
//! Each [`VideoRecord`] becomes one `<item>`, in record order. The manifest
//! is attached as an `<enclosure>` so podcast-style readers can play it, and
//! the article image (when known) as a Media RSS `<media:content>`.
//!
//! ```text
//! <rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
//!   <channel>
//!     <title>m3u8 Video Feed</title>
//!     <link>{category url}</link>
//!     ...
//!     <item>
//!       <title/> <link/> <description/> <guid isPermaLink="false"/> <pubDate/>
//!       <media:content url medium="image" width height/>
//!       <enclosure url type="application/x-mpegURL" length="0"/>
//!     </item>
//!   </channel>
//! </rss>
//! ```

use crate::error::SerializationError;
use crate::models::VideoRecord;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Write;
use tracing::{debug, instrument};

pub const FEED_TITLE: &str = "m3u8 Video Feed";
pub const FEED_DESCRIPTION: &str = "Extracted m3u8 URLs from video pages";
pub const MANIFEST_MIME_TYPE: &str = "application/x-mpegURL";
const MEDIA_RSS_NS: &str = "http://search.yahoo.com/mrss/";
const RSS_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S +0000";
const TITLE_FRAGMENT_CHARS: usize = 50;

/// Format a timestamp as an RSS `pubDate` (RFC 2822, always `+0000`).
pub fn format_rss_date(dt: DateTime<Utc>) -> String {
    dt.format(RSS_DATE_FORMAT).to_string()
}

/// Parse an article timestamp, normalised to UTC.
///
/// Accepts RFC 3339, a zone-less ISO-8601 date-time (read as UTC), a bare
/// date (midnight UTC) and RFC 2822.
pub fn parse_published_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    None
}

/// `pubDate` for an item: the parsed article time, or `now` when it is
/// missing or unreadable.
pub fn pub_date(published_time: Option<&str>, now: DateTime<Utc>) -> String {
    let parsed = published_time.and_then(|raw| {
        let parsed = parse_published_time(raw);
        if parsed.is_none() {
            debug!(raw, "Unparseable published_time; using build time");
        }
        parsed
    });
    format_rss_date(parsed.unwrap_or(now))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaImage {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// The fields of one `<item>`, with fallbacks already applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub description: String,
    pub pub_date: String,
    pub image: Option<MediaImage>,
    pub manifest_url: String,
}

impl FeedItem {
    pub fn from_record(record: &VideoRecord, now: DateTime<Utc>) -> Self {
        let meta = &record.metadata;
        let title = meta.title.clone().unwrap_or_else(|| {
            let fragment = record
                .manifest_url
                .chars()
                .take(TITLE_FRAGMENT_CHARS)
                .collect::<String>();
            format!("Video - {fragment}...")
        });
        let link = meta.canonical_url.as_ref().unwrap_or(&record.page_url).clone();
        let description = meta
            .description
            .clone()
            .unwrap_or_else(|| format!("m3u8 URL: {}", record.manifest_url));
        let image = meta.image_url.as_ref().map(|url| MediaImage {
            url: url.clone(),
            width: meta.image_width,
            height: meta.image_height,
        });

        Self {
            title,
            link,
            description,
            pub_date: pub_date(meta.published_time.as_deref(), now),
            image,
            manifest_url: record.manifest_url.clone(),
        }
    }
}

fn xml_err(e: impl std::fmt::Display) -> SerializationError {
    SerializationError::Xml(e.to_string())
}

/// Drop characters XML 1.0 does not allow (C0 controls other than tab, LF, CR).
fn sanitize_text(input: &str) -> String {
    input
        .chars()
        .filter(|&c| matches!(c, '\t' | '\n' | '\r') || c >= ' ')
        .collect()
}

fn write_text_element<W: Write>(
    w: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<(), SerializationError> {
    w.write_event(Event::Start(BytesStart::new(name))).map_err(xml_err)?;
    w.write_event(Event::Text(BytesText::new(&sanitize_text(text)))).map_err(xml_err)?;
    w.write_event(Event::End(BytesEnd::new(name))).map_err(xml_err)?;
    Ok(())
}

fn write_item<W: Write>(w: &mut Writer<W>, item: &FeedItem) -> Result<(), SerializationError> {
    w.write_event(Event::Start(BytesStart::new("item"))).map_err(xml_err)?;
    write_text_element(w, "title", &item.title)?;
    write_text_element(w, "link", &item.link)?;
    write_text_element(w, "description", &item.description)?;

    let mut guid = BytesStart::new("guid");
    guid.push_attribute(("isPermaLink", "false"));
    w.write_event(Event::Start(guid)).map_err(xml_err)?;
    let manifest = sanitize_text(&item.manifest_url);
    w.write_event(Event::Text(BytesText::new(&manifest))).map_err(xml_err)?;
    w.write_event(Event::End(BytesEnd::new("guid"))).map_err(xml_err)?;

    write_text_element(w, "pubDate", &item.pub_date)?;

    if let Some(image) = &item.image {
        let mut media = BytesStart::new("media:content");
        media.push_attribute(("url", image.url.as_str()));
        media.push_attribute(("medium", "image"));
        if let Some(width) = image.width {
            media.push_attribute(("width", width.to_string().as_str()));
        }
        if let Some(height) = image.height {
            media.push_attribute(("height", height.to_string().as_str()));
        }
        w.write_event(Event::Empty(media)).map_err(xml_err)?;
    }

    // Length is unknown at crawl time.
    let mut enclosure = BytesStart::new("enclosure");
    enclosure.push_attribute(("url", item.manifest_url.as_str()));
    enclosure.push_attribute(("type", MANIFEST_MIME_TYPE));
    enclosure.push_attribute(("length", "0"));
    w.write_event(Event::Empty(enclosure)).map_err(xml_err)?;

    w.write_event(Event::End(BytesEnd::new("item"))).map_err(xml_err)?;
    Ok(())
}

/// Render `records` as an RSS 2.0 document for the category page `origin`.
///
/// `now` is used for `lastBuildDate` and as the `pubDate` of items whose
/// publish time is missing or unreadable.
#[instrument(level = "info", skip(records, now), fields(items = records.len()))]
pub fn build_feed(
    records: &[VideoRecord],
    origin: &str,
    now: DateTime<Utc>,
) -> Result<String, SerializationError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(xml_err)?;

    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", "2.0"));
    rss.push_attribute(("xmlns:media", MEDIA_RSS_NS));
    writer.write_event(Event::Start(rss)).map_err(xml_err)?;
    writer
        .write_event(Event::Start(BytesStart::new("channel")))
        .map_err(xml_err)?;

    write_text_element(&mut writer, "title", FEED_TITLE)?;
    write_text_element(&mut writer, "link", origin)?;
    write_text_element(&mut writer, "description", FEED_DESCRIPTION)?;
    write_text_element(&mut writer, "lastBuildDate", &format_rss_date(now))?;

    for record in records {
        write_item(&mut writer, &FeedItem::from_record(record, now))?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("channel")))
        .map_err(xml_err)?;
    writer
        .write_event(Event::End(BytesEnd::new("rss")))
        .map_err(xml_err)?;

    let mut xml = String::from_utf8(writer.into_inner()).map_err(xml_err)?;
    xml.push('\n');
    Ok(xml)
}
