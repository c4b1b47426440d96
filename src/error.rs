//! Error types for each stage of the crawl.
//!
//! Only [`LoadError`], [`ConfigError`] and [`SerializationError`] ever end a
//! run. [`FetchError`] is scoped to a single article: the fetcher logs it and
//! moves on to the next link.

use thiserror::Error;

/// The category page could not be rendered.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to launch browser: {0}")]
    Launch(String),
    #[error("browser session error: {0}")]
    Browser(String),
    #[error("page load cancelled")]
    Cancelled,
}

/// A single article could not be fetched.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

impl FetchError {
    /// Classify a reqwest error for `url`, separating timeouts from other
    /// transport failures.
    pub fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else if let Some(status) = source.status() {
            FetchError::Status {
                url: url.to_string(),
                status,
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                source,
            }
        }
    }
}

/// Building or writing an output document failed.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("failed to write XML: {0}")]
    Xml(String),
    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write output file: {0}")]
    Io(#[from] std::io::Error),
}

/// Invalid or unreadable configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("no category URL given (pass it as an argument or set `url` in the config file)")]
    MissingUrl,
    #[error("invalid category URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Anything that aborts the whole run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Serialization(#[from] SerializationError),
    #[error("run cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_display() {
        let e = LoadError::Launch("no chrome".to_string());
        assert_eq!(e.to_string(), "failed to launch browser: no chrome");
    }

    #[test]
    fn test_timeout_display_names_url() {
        let e = FetchError::Timeout {
            url: "https://example.com/a".to_string(),
        };
        assert_eq!(e.to_string(), "request to https://example.com/a timed out");
    }

    #[test]
    fn test_run_error_is_transparent_over_load_error() {
        let e: RunError = LoadError::Browser("target closed".to_string()).into();
        assert_eq!(e.to_string(), "browser session error: target closed");
    }
}
