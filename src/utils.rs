//! Utility functions for string handling, URLs, timestamps, and file system operations.
//!
//! - String truncation on character boundaries for logs and API queries
//! - Domain extraction from article URLs
//! - Archive naming derived from the run timestamp
//! - Output directory validation and atomic file replacement

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::error::PersistenceError;

/// Truncate a string for logging purposes.
///
/// Strings longer than `max` characters are cut and suffixed with
/// `"…(+N bytes)"`, N being the number of dropped bytes.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// The first `max` characters of `s`.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        None => s,
        Some((cut, _)) => &s[..cut],
    }
}

/// Host of an article URL without a leading `www.`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(domain_of("https://www.spiegel.de/politik/x"), Some("spiegel.de".into()));
/// ```
pub fn domain_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_lowercase())
}

/// Identifier of a run's archive files, e.g. `results_20250506_1430`.
pub fn archive_stem(generated_at: &DateTime<Utc>) -> String {
    format!("results_{}", generated_at.format("%Y%m%d_%H%M"))
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then creates and removes a probe file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), PersistenceError> {
    fs::create_dir_all(path)
        .await
        .map_err(|e| PersistenceError::io(path, e))?;

    let probe_path = path.join("..__probe_write__");
    fs::write(&probe_path, b"")
        .await
        .map_err(|e| PersistenceError::io(&probe_path, e))?;
    let _ = fs::remove_file(&probe_path).await;
    info!("Output directory is writable");
    Ok(())
}

/// Replace `path` with `contents` without ever exposing a partial file.
///
/// The bytes go to a hidden temp file in the same directory, which is synced
/// and then renamed over `path`.
///
/// # Arguments
///
/// * `path` - Final destination; its parent directory must exist
/// * `contents` - The complete new file content
///
/// # Errors
///
/// Returns [`PersistenceError::Io`] naming the file that failed. The temp
/// file is removed and `path` keeps its previous content.
#[instrument(level = "debug", skip(contents), fields(path = %path.display(), bytes = contents.len()))]
pub async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), PersistenceError> {
    let tmp_path = temp_path_for(path);

    let result = async {
        let mut file = fs::File::create(&tmp_path)
            .await
            .map_err(|e| PersistenceError::io(&tmp_path, e))?;
        file.write_all(contents)
            .await
            .map_err(|e| PersistenceError::io(&tmp_path, e))?;
        file.sync_all()
            .await
            .map_err(|e| PersistenceError::io(&tmp_path, e))?;
        drop(file);
        fs::rename(&tmp_path, path)
            .await
            .map_err(|e| PersistenceError::io(path, e))
    }
    .await;

    match result {
        Ok(()) => {
            debug!("Replaced file atomically");
            Ok(())
        }
        Err(e) => {
            if let Err(cleanup) = fs::remove_file(&tmp_path).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    warn!(tmp = %tmp_path.display(), error = %cleanup, "Could not remove temp file");
                }
            }
            Err(e)
        }
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp-{}", name, std::process::id()))
}
