//! Command-line interface definitions.
//!
//! Every option may also come from the YAML config file (see
//! [`crate::config`]); flags given here win over the file.

use crate::config::OutputFormat;
use clap::Parser;

/// Crawl an infinite-scroll category page and build an RSS feed of the m3u8
/// streams found in its articles.
///
/// # Examples
///
/// ```sh
/// # Feed of everything reachable by scrolling
/// m3u8_feed https://fintech.tv/category/market-movers-the-opening-bell/
///
/// # Only the first screenful, as JSON + a plain URL list
/// m3u8_feed https://fintech.tv/category/market-movers-the-opening-bell/ \
///     --first-page-only --format json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Category / listing page to crawl
    #[arg(env = "M3U8_FEED_URL")]
    pub url: Option<String>,

    /// Optional path to a YAML config file
    #[arg(short, long, env = "M3U8_FEED_CONFIG")]
    pub config: Option<String>,

    /// Maximum number of scroll cycles on the category page [default: 20]
    #[arg(long)]
    pub max_scrolls: Option<u32>,

    /// Seconds to wait after each scroll for new content [default: 2]
    #[arg(long)]
    pub settle_delay_secs: Option<u64>,

    /// Scroll at most once (first page of results only)
    #[arg(long)]
    pub first_page_only: bool,

    /// Timeout in seconds for each article request [default: 10]
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// User-Agent header for article requests and the browser
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Output format [default: rss]
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Output file (feed for `rss`, records for `json`)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Plain manifest URL list (json format only) [default: m3u8_urls.txt]
    #[arg(long)]
    pub list_output: Option<String>,
}
