//! # m3u8_feed
//!
//! Crawls an infinite-scroll category page, finds the m3u8 manifest URL in
//! every linked article, and publishes the results as an RSS feed (or as a
//! JSON dump plus a plain list of manifest URLs).
//!
//! ## Usage
//!
//! ```sh
//! m3u8_feed https://fintech.tv/category/market-movers-the-opening-bell/ -o rss.xml
//! ```
//!
//! ## Architecture
//!
//! The run is a strictly sequential pipeline:
//! 1. **Loading**: render the category page in headless Chromium and scroll until it stops growing
//! 2. **Discovery**: collect same-site article links from the rendered markup
//! 3. **Fetching**: GET each article, pull out its manifest URL and `<meta>` data
//! 4. **Output**: write the RSS feed or the flat dump once every article is done
//!
//! Ctrl-C cancels the run; nothing is written for a cancelled run.

use chrono::Utc;
use clap::Parser;
use std::error::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod utils;

use cli::Cli;
use config::{OutputFormat, Settings};
use scrapers::articles::HttpFetcher;
use scrapers::browser::ChromiumLauncher;
use utils::{ensure_writable_dir, parent_dir};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("m3u8_feed starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let settings = match Settings::from_cli(&args) {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    info!(
        url = %settings.url,
        max_scrolls = settings.scroll.max_iterations,
        settle_delay = ?settings.scroll.settle_delay,
        first_page_only = settings.scroll.stop_after_first,
        format = ?settings.format,
        "Configuration loaded"
    );

    // Early check: output locations must be writable before spending minutes crawling
    let mut output_dirs = vec![parent_dir(&settings.output)];
    if settings.format == OutputFormat::Json {
        output_dirs.push(parent_dir(&settings.list_output));
    }
    for dir in &output_dirs {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(path = %dir, error = %e, "Output directory is not writable (fix perms or choose a different path)");
            return Err(e);
        }
    }

    // --- Cancellation on Ctrl-C ---
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received; cancelling run");
                cancel.cancel();
            }
        });
    }

    let launcher = ChromiumLauncher::new(settings.user_agent.clone());
    let fetcher = HttpFetcher::new(&settings.user_agent, settings.request_timeout)?;

    // ---- Load, discover, fetch ----
    let records = match pipeline::crawl(
        &launcher,
        &fetcher,
        &settings.url,
        &settings.scroll,
        &cancel,
    )
    .await
    {
        Ok(records) => records,
        Err(e) => {
            error!(error = %e, "Failed to fetch category page");
            return Err(e.into());
        }
    };

    // ---- Output ----
    if records.is_empty() {
        info!("No m3u8 URLs were extracted; nothing to write");
    } else {
        if let Err(e) = pipeline::write_output(&settings, &records, Utc::now()).await {
            error!(error = %e, "Failed to write output");
            return Err(e.into());
        }
        info!(count = records.len(), "Successfully extracted m3u8 URLs");
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
