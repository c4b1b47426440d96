//! Infinite-scroll loading of the category page.
//!
//! Category pages append more articles as the reader scrolls, so a single
//! fetch only sees the first batch. The page is rendered in a browser and
//! scrolled to the bottom repeatedly until its height stops growing or the
//! scroll budget runs out, then the rendered markup is captured.
//!
//! The browser is reached through [`BrowserLauncher`] and [`RenderedPage`];
//! [`crate::scrapers::browser`] drives Chromium, tests use an in-memory page.

use crate::error::LoadError;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// A live, rendered browser tab.
#[allow(async_fn_in_trait)]
pub trait RenderedPage {
    /// Load `url` in the tab.
    async fn navigate(&mut self, url: &str) -> Result<(), LoadError>;
    /// Current `document.body.scrollHeight`.
    async fn page_height(&mut self) -> Result<u64, LoadError>;
    async fn scroll_to_bottom(&mut self) -> Result<(), LoadError>;
    /// Full rendered markup of the tab.
    async fn snapshot(&mut self) -> Result<String, LoadError>;
    /// Tear down the tab and the browser behind it.
    async fn close(&mut self) -> Result<(), LoadError>;
}

/// Starts one browser session per call.
#[allow(async_fn_in_trait)]
pub trait BrowserLauncher {
    type Page: RenderedPage;

    async fn launch(&self) -> Result<Self::Page, LoadError>;
}

/// How far to scroll the category page.
#[derive(Debug, Clone)]
pub struct ScrollConfig {
    /// Upper bound on scroll cycles.
    pub max_iterations: u32,
    /// Pause after each scroll for new content to arrive.
    pub settle_delay: Duration,
    /// Scroll at most once, for "first page only" runs.
    pub stop_after_first: bool,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            max_iterations: 20,
            settle_delay: Duration::from_secs(2),
            stop_after_first: false,
        }
    }
}

impl ScrollConfig {
    /// Number of scroll cycles this configuration allows.
    pub fn iteration_budget(&self) -> u32 {
        if self.stop_after_first {
            self.max_iterations.min(1)
        } else {
            self.max_iterations
        }
    }
}

/// Progress of a single scroll-loading run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollState {
    pub last_height: u64,
    pub iterations: u32,
    pub max_iterations: u32,
}

impl ScrollState {
    pub fn new(initial_height: u64, max_iterations: u32) -> Self {
        Self {
            last_height: initial_height,
            iterations: 0,
            max_iterations,
        }
    }

    pub fn can_scroll(&self) -> bool {
        self.iterations < self.max_iterations
    }

    /// Count one scroll cycle that ended at `height`. Returns `true` if the
    /// page changed height and scrolling should go on.
    pub fn record(&mut self, height: u64) -> bool {
        self.iterations += 1;
        let changed = height != self.last_height;
        self.last_height = height;
        changed
    }
}

/// Rendered markup of the fully scrolled page.
#[derive(Debug, Clone)]
pub struct ScrollOutcome {
    pub html: String,
    /// Scroll cycles performed.
    pub iterations: u32,
    /// `true` when scrolling stopped because the height stopped changing.
    pub exhausted: bool,
}

/// Launch a browser, scroll `url` until it stops growing, and return the
/// rendered markup.
///
/// The session is closed on every path, including errors and cancellation.
/// A failed launch is returned as-is; there is no retry.
#[instrument(level = "info", skip(launcher, config, cancel))]
pub async fn load_rendered<L: BrowserLauncher>(
    launcher: &L,
    url: &str,
    config: &ScrollConfig,
    cancel: &CancellationToken,
) -> Result<ScrollOutcome, LoadError> {
    info!("Launching browser");
    let mut page = launcher.launch().await?;

    let outcome = scroll_page(&mut page, url, config, cancel).await;

    if let Err(e) = page.close().await {
        warn!(error = %e, "Failed to close browser session");
    }
    outcome
}

/// Run one browser step, giving up as soon as `cancel` fires.
async fn or_cancelled<T>(
    cancel: &CancellationToken,
    step: impl Future<Output = Result<T, LoadError>>,
) -> Result<T, LoadError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(LoadError::Cancelled),
        result = step => result,
    }
}

/// Scroll an already open `page`. Navigation errors are logged and loading
/// carries on with whatever the tab managed to render.
///
/// Every browser call and every settle pause is raced against `cancel`.
pub async fn scroll_page<P: RenderedPage>(
    page: &mut P,
    url: &str,
    config: &ScrollConfig,
    cancel: &CancellationToken,
) -> Result<ScrollOutcome, LoadError> {
    info!(%url, "Loading page");
    match or_cancelled(cancel, page.navigate(url)).await {
        Ok(()) => {}
        Err(LoadError::Cancelled) => return Err(LoadError::Cancelled),
        Err(e) => {
            warn!(%url, error = %e, "Navigation failed; continuing with available content");
        }
    }

    let initial_height = or_cancelled(cancel, page.page_height()).await?;
    let mut state = ScrollState::new(initial_height, config.iteration_budget());
    let mut exhausted = false;
    debug!(
        height = state.last_height,
        budget = state.max_iterations,
        "Starting scroll"
    );

    while state.can_scroll() {
        or_cancelled(cancel, page.scroll_to_bottom()).await?;
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(LoadError::Cancelled),
            _ = tokio::time::sleep(config.settle_delay) => {}
        }

        let height = or_cancelled(cancel, page.page_height()).await?;
        if !state.record(height) {
            info!(iterations = state.iterations, "Reached end of page");
            exhausted = true;
            break;
        }
        info!(
            iteration = state.iterations,
            max = state.max_iterations,
            height,
            "Scrolled"
        );
    }

    let html = or_cancelled(cancel, page.snapshot()).await?;
    info!(
        bytes = html.len(),
        iterations = state.iterations,
        "Captured rendered page"
    );
    Ok(ScrollOutcome {
        html,
        iterations: state.iterations,
        exhausted,
    })
}
