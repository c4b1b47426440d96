//! Output writers.
//!
//! # Submodules
//!
//! - [`rss`]: RSS 2.0 feed of the extracted videos
//! - [`json`]: flat JSON records plus a plain list of manifest URLs
//!
//! Files are written only once the crawl has finished, through
//! [`write_atomically`], so an interrupted run never leaves a half-written
//! feed behind.

pub mod json;
pub mod rss;

use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Write `contents` to `path` via a sibling temp file and a rename.
///
/// Missing parent directories are created.
pub async fn write_atomically(path: &str, contents: &[u8]) -> std::io::Result<()> {
    let target = Path::new(path);
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    let tmp = format!("{path}.tmp");
    fs::write(&tmp, contents).await?;
    if let Err(e) = fs::rename(&tmp, target).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e);
    }
    debug!(path, bytes = contents.len(), "Wrote file");
    Ok(())
}
