//! Flat data dump for tooling that does not want a feed.
//!
//! Two files are produced from the same records:
//!
//! ```text
//! m3u8_results.json   # [{page_url, manifest_url, metadata?, discovered_at}, ...]
//! m3u8_urls.txt       # one manifest URL per line
//! ```

use crate::error::SerializationError;
use crate::models::VideoRecord;
use crate::outputs::write_atomically;
use tracing::{info, instrument};

/// Pretty-printed JSON array of `records`.
pub fn records_to_json(records: &[VideoRecord]) -> Result<String, SerializationError> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Manifest URLs, one per line, in record order.
pub fn manifest_list(records: &[VideoRecord]) -> String {
    records.iter().map(|r| format!("{}\n", r.manifest_url)).collect()
}

/// Write the JSON records to `json_path`.
#[instrument(level = "info", skip(records), fields(count = records.len()))]
pub async fn write_records(
    records: &[VideoRecord],
    json_path: &str,
) -> Result<(), SerializationError> {
    let json = records_to_json(records)?;
    write_atomically(json_path, json.as_bytes()).await?;
    info!(path = %json_path, "Wrote JSON results");
    Ok(())
}

/// Write both the JSON records and the manifest list.
#[instrument(level = "info", skip(records), fields(count = records.len()))]
pub async fn write_dump(
    records: &[VideoRecord],
    json_path: &str,
    list_path: &str,
) -> Result<(), SerializationError> {
    write_records(records, json_path).await?;
    write_atomically(list_path, manifest_list(records).as_bytes()).await?;
    info!(path = %list_path, "Wrote m3u8 URL list");
    Ok(())
}
