//! Headless Chromium backend for the scroll loader, via `chromiumoxide`.
//!
//! A Chrome or Chromium executable must be installed; it is located the same
//! way `chromiumoxide` always does (`CHROME` env var, then well-known paths).

use crate::error::LoadError;
use crate::scrapers::scroll::{BrowserLauncher, RenderedPage};
use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

const HEIGHT_SCRIPT: &str = "document.body.scrollHeight";
const SCROLL_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight)";

/// Bound on each CDP request, page navigation included. Kept apart from the
/// article GET timeout; listing pages can take far longer to render.
pub const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

fn browser_err(e: impl std::fmt::Display) -> LoadError {
    LoadError::Browser(e.to_string())
}

/// Launches a fresh headless Chromium per session.
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    user_agent: String,
    navigation_timeout: Duration,
}

impl ChromiumLauncher {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            navigation_timeout: NAVIGATION_TIMEOUT,
        }
    }
}

/// One Chromium process with a single tab.
///
/// The CDP event handler runs on its own task; it is aborted on [`close`]
/// and again on drop so a failed run never leaves it spinning.
///
/// [`close`]: RenderedPage::close
pub struct ChromiumPage {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl BrowserLauncher for ChromiumLauncher {
    type Page = ChromiumPage;

    async fn launch(&self) -> Result<ChromiumPage, LoadError> {
        let config = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(self.navigation_timeout)
            .window_size(1920, 1080)
            .arg(format!("--user-agent={}", self.user_agent))
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--mute-audio")
            .build()
            .map_err(LoadError::Launch)?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| LoadError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = ?e, "Browser handler error");
                }
            }
            debug!("Browser event handler finished");
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                handler_task.abort();
                return Err(LoadError::Launch(e.to_string()));
            }
        };

        info!("Browser launched");
        Ok(ChromiumPage {
            browser,
            page,
            handler_task,
        })
    }
}

impl RenderedPage for ChromiumPage {
    async fn navigate(&mut self, url: &str) -> Result<(), LoadError> {
        self.page.goto(url).await.map_err(browser_err)?;
        self.page.wait_for_navigation().await.map_err(browser_err)?;
        Ok(())
    }

    async fn page_height(&mut self) -> Result<u64, LoadError> {
        self.page
            .evaluate(HEIGHT_SCRIPT)
            .await
            .map_err(browser_err)?
            .into_value::<u64>()
            .map_err(browser_err)
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), LoadError> {
        self.page.evaluate(SCROLL_SCRIPT).await.map_err(browser_err)?;
        Ok(())
    }

    async fn snapshot(&mut self) -> Result<String, LoadError> {
        self.page.content().await.map_err(browser_err)
    }

    async fn close(&mut self) -> Result<(), LoadError> {
        let closed = self.browser.close().await.map_err(browser_err);
        if closed.is_ok() {
            let _ = self.browser.wait().await;
        }
        self.handler_task.abort();
        info!("Browser closed");
        closed.map(|_| ())
    }
}

impl Drop for ChromiumPage {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}
