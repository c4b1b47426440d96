//! The crawl, end to end.
//!
//! 1. **Loading**: render the category page and scroll until it stops growing
//! 2. **Discovery**: pick the article links out of the rendered markup
//! 3. **Fetching**: fetch each article in turn and extract its manifest
//! 4. **Output**: write the feed or the flat dump, only after all of the above

use crate::config::{OutputFormat, Settings};
use crate::error::{LoadError, RunError, SerializationError};
use crate::models::VideoRecord;
use crate::outputs::{json, rss, write_atomically};
use crate::scrapers::articles::{PageFetcher, fetch_videos};
use crate::scrapers::links::discover_links;
use crate::scrapers::scroll::{BrowserLauncher, ScrollConfig, load_rendered};
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};
use url::Url;

/// Load `origin`, discover its articles and extract a record per video, in
/// discovery order.
///
/// Only a failure to render the category page (or cancellation) is an error.
/// A page with no article links yields an empty list.
#[instrument(level = "info", skip_all, fields(origin = %origin))]
pub async fn crawl<L: BrowserLauncher, F: PageFetcher>(
    launcher: &L,
    fetcher: &F,
    origin: &Url,
    scroll: &ScrollConfig,
    cancel: &CancellationToken,
) -> Result<Vec<VideoRecord>, RunError> {
    let rendered = load_rendered(launcher, origin.as_str(), scroll, cancel)
        .await
        .map_err(|e| match e {
            LoadError::Cancelled => RunError::Cancelled,
            other => RunError::Load(other),
        })?;
    info!(
        scrolls = rendered.iterations,
        exhausted = rendered.exhausted,
        "Category page loaded"
    );

    let links = discover_links(&rendered.html, origin);
    if links.is_empty() {
        info!("No article links found on category page");
        return Ok(Vec::new());
    }
    info!(count = links.len(), "Found video page URLs");

    fetch_videos(fetcher, &links, cancel).await
}

/// Path of the JSON dump written when the feed cannot be produced.
pub fn fallback_dump_path(output: &str) -> String {
    format!("{output}.json")
}

async fn write_feed(
    settings: &Settings,
    records: &[VideoRecord],
    now: DateTime<Utc>,
) -> Result<(), SerializationError> {
    let xml = rss::build_feed(records, settings.url.as_str(), now)?;
    write_atomically(&settings.output, xml.as_bytes()).await?;
    Ok(())
}

/// Write `records` in the configured format.
///
/// If the RSS feed cannot be built or written, the records are still saved
/// as JSON next to the requested output before the error is returned.
#[instrument(
    level = "info",
    skip(settings, records, now),
    fields(format = ?settings.format, output = %settings.output)
)]
pub async fn write_output(
    settings: &Settings,
    records: &[VideoRecord],
    now: DateTime<Utc>,
) -> Result<(), RunError> {
    match settings.format {
        OutputFormat::Rss => {
            if let Err(e) = write_feed(settings, records, now).await {
                let fallback = fallback_dump_path(&settings.output);
                error!(
                    error = %e,
                    path = %fallback,
                    "Failed to write RSS feed; saving raw results"
                );
                if let Err(dump_err) = json::write_records(records, &fallback).await {
                    error!(error = %dump_err, "Failed to save raw results");
                }
                return Err(e.into());
            }
            info!(path = %settings.output, items = records.len(), "RSS feed generated");
        }
        OutputFormat::Json => {
            json::write_dump(records, &settings.output, &settings.list_output).await?;
        }
    }
    Ok(())
}
