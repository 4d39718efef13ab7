//! JSON output for the web front end.
//!
//! The [`ResultSet`] is written as an indented JSON object keyed by source
//! id. Hangul and other non-ASCII text is written as-is, not `\u` escaped.
//!
//! The file is first written to a temporary sibling and then renamed over
//! the target, so readers never observe a half-written file.

use crate::models::ResultSet;
use crate::utils::ensure_parent_writable;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Serialize `results` and replace the file at `output_path`.
///
/// # Errors
///
/// Fails if the parent directory cannot be created or written, or if the
/// write or rename fails.
#[instrument(level = "info", skip_all, fields(path = %output_path.as_ref().display()))]
pub async fn write_result_set(
    results: &ResultSet,
    output_path: impl AsRef<Path>,
) -> Result<(), Box<dyn Error>> {
    let output_path = output_path.as_ref();
    let json = serde_json::to_string_pretty(results)?;

    ensure_parent_writable(output_path).await?;

    let tmp_path = temp_sibling(output_path);
    if let Err(e) = fs::write(&tmp_path, json.as_bytes()).await {
        error!(path = %tmp_path.display(), error = %e, "Failed to write temporary JSON");
        return Err(e.into());
    }
    fs::rename(&tmp_path, output_path).await?;

    info!(
        sources = results.source_ids().count(),
        articles = results.article_count(),
        bytes = json.len(),
        "Wrote JSON file"
    );
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "data.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}
