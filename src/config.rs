//! Run configuration.
//!
//! Values are layered: built-in defaults, then the optional YAML file, then
//! command-line flags. A config file may set any subset of:
//!
//! ```yaml
//! url: https://fintech.tv/category/market-movers-the-opening-bell/
//! max_scrolls: 20
//! settle_delay_secs: 3
//! first_page_only: false
//! timeout_secs: 10
//! user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36"
//! format: rss
//! output: feeds/opening-bell.xml
//! list_output: feeds/opening-bell.txt
//! ```

use crate::cli::Cli;
use crate::error::ConfigError;
use crate::scrapers::scroll::ScrollConfig;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
pub const DEFAULT_MAX_SCROLLS: u32 = 20;
pub const DEFAULT_SETTLE_DELAY_SECS: u64 = 2;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_RSS_OUTPUT: &str = "rss.xml";
pub const DEFAULT_JSON_OUTPUT: &str = "m3u8_results.json";
pub const DEFAULT_LIST_OUTPUT: &str = "m3u8_urls.txt";

/// What to write once the crawl is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// RSS 2.0 feed
    #[default]
    Rss,
    /// JSON records plus a plain list of manifest URLs
    Json,
}

/// Contents of the YAML config file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub url: Option<String>,
    pub max_scrolls: Option<u32>,
    pub settle_delay_secs: Option<u64>,
    pub first_page_only: Option<bool>,
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    pub format: Option<OutputFormat>,
    pub output: Option<String>,
    pub list_output: Option<String>,
}

impl FileConfig {
    pub fn from_yaml(path: &str, yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        let config = Self::from_yaml(path, &yaml)?;
        info!(path, "Loaded config file");
        Ok(config)
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub url: Url,
    pub scroll: ScrollConfig,
    pub request_timeout: Duration,
    pub user_agent: String,
    pub format: OutputFormat,
    pub output: String,
    /// Only used with [`OutputFormat::Json`].
    pub list_output: String,
}

impl Settings {
    /// Load the config file named on the command line (if any) and merge.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(cli, file)
    }

    /// Merge command-line flags over `file` over defaults.
    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self, ConfigError> {
        let raw_url = cli.url.clone().or(file.url).ok_or(ConfigError::MissingUrl)?;
        let url = Url::parse(raw_url.trim()).map_err(|source| ConfigError::InvalidUrl {
            url: raw_url.clone(),
            source,
        })?;

        let settle_delay_secs = cli
            .settle_delay_secs
            .or(file.settle_delay_secs)
            .unwrap_or(DEFAULT_SETTLE_DELAY_SECS);
        if !(2..=5).contains(&settle_delay_secs) {
            warn!(
                settle_delay_secs,
                "Settle delay outside the usual 2-5s range"
            );
        }

        let scroll = ScrollConfig {
            max_iterations: cli
                .max_scrolls
                .or(file.max_scrolls)
                .unwrap_or(DEFAULT_MAX_SCROLLS),
            settle_delay: Duration::from_secs(settle_delay_secs),
            stop_after_first: cli.first_page_only || file.first_page_only.unwrap_or(false),
        };

        let format = cli.format.or(file.format).unwrap_or_default();
        let output = cli.output.clone().or(file.output).unwrap_or_else(|| {
            match format {
                OutputFormat::Rss => DEFAULT_RSS_OUTPUT,
                OutputFormat::Json => DEFAULT_JSON_OUTPUT,
            }
            .to_string()
        });

        Ok(Self {
            url,
            scroll,
            request_timeout: Duration::from_secs(
                cli.timeout_secs.or(file.timeout_secs).unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            user_agent: cli
                .user_agent
                .clone()
                .or(file.user_agent)
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            format,
            output,
            list_output: cli
                .list_output
                .clone()
                .or(file.list_output)
                .unwrap_or_else(|| DEFAULT_LIST_OUTPUT.to_string()),
        })
    }
}
