//! Article fetching and per-article extraction.
//!
//! Articles are fetched one at a time, in link order. A failed fetch or a page
//! without a manifest is logged and skipped; neither stops the run.

use crate::error::{FetchError, RunError};
use crate::models::{LinkSet, VideoRecord};
use crate::scrapers::manifest::find_manifest_url;
use crate::scrapers::metadata::extract_metadata;
use crate::utils::truncate_for_log;
use reqwest::Client;
use scraper::Html;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Fetches the raw markup of an article page.
#[allow(async_fn_in_trait)]
pub trait PageFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// [`PageFetcher`] over a reqwest client with a fixed user agent and timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        response.text().await.map_err(|e| FetchError::from_reqwest(url, e))
    }
}

/// Build a record from an article's markup, or `None` if it has no manifest.
pub fn extract_video(page_url: &str, body: &str) -> Option<VideoRecord> {
    let manifest_url = find_manifest_url(body)?;
    let metadata = extract_metadata(&Html::parse_document(body));
    let record = VideoRecord::new(page_url.to_string(), manifest_url, metadata);
    Some(record)
}

/// Fetch a single article and extract its video record.
#[instrument(level = "debug", skip(fetcher))]
async fn fetch_video<F: PageFetcher>(
    fetcher: &F,
    url: &str,
) -> Result<Option<VideoRecord>, FetchError> {
    let body = fetcher.fetch(url).await?;
    debug!(bytes = body.len(), "Fetched article");
    Ok(extract_video(url, &body))
}

/// Fetch every article in `links`, in order, and collect the ones with a manifest.
///
/// Returns [`RunError::Cancelled`] if `cancel` fires; records gathered so far
/// are dropped with it.
#[instrument(level = "info", skip_all, fields(links = links.len()))]
pub async fn fetch_videos<F: PageFetcher>(
    fetcher: &F,
    links: &LinkSet,
    cancel: &CancellationToken,
) -> Result<Vec<VideoRecord>, RunError> {
    let total = links.len();
    let mut videos = Vec::new();

    for (i, url) in links.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(RunError::Cancelled);
        }
        info!("[{}/{}] Processing: {}", i + 1, total, url);

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RunError::Cancelled),
            result = fetch_video(fetcher, url) => result,
        };

        match result {
            Ok(Some(video)) => {
                info!(
                    %url,
                    manifest = %truncate_for_log(&video.manifest_url, 80),
                    "Found m3u8"
                );
                videos.push(video);
            }
            Ok(None) => {
                info!(%url, "No m3u8 URL found");
            }
            Err(e) => {
                warn!(%url, error = %e, "Article fetch failed; skipping");
            }
        }
    }

    info!(
        total,
        found = videos.len(),
        skipped = total - videos.len(),
        "Finished fetching articles"
    );
    Ok(videos)
}
