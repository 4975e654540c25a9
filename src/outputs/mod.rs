//! Result persistence: archive snapshots and the latest pointer.
//!
//! # Submodules
//!
//! - [`json`]: renders a `ResultSet` as JSON for the dashboard
//! - [`tabular`]: renders the same `ResultSet` as CSV
//!
//! # Output Structure
//!
//! ```text
//! results/
//! ├── results_20250506_0800.json   # archive, one pair per run
//! ├── results_20250506_0800.csv
//! ├── results_20250506_1400.json
//! ├── results_20250506_1400.csv
//! ├── latest.json                  # overwritten every run
//! └── latest.csv
//! ```
//!
//! Every file is replaced atomically. Archive files are written before the
//! latest pointer, so `latest.*` always matches an archive on disk. Archives
//! are never overwritten; see [`ArchiveTarget::reserve`].

pub mod json;
pub mod tabular;

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument, warn};

use crate::error::PersistenceError;
use crate::models::ResultSet;
use crate::utils::{archive_stem, write_atomic};

pub const LATEST_STEM: &str = "latest";

/// The JSON and CSV destinations sharing one file stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub json: PathBuf,
    pub csv: PathBuf,
}

impl OutputPaths {
    fn new(results_dir: &Path, stem: &str) -> Self {
        Self {
            json: results_dir.join(format!("{stem}.json")),
            csv: results_dir.join(format!("{stem}.csv")),
        }
    }
}

/// Where one run's immutable snapshot goes, named from its timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveTarget {
    paths: OutputPaths,
}

impl ArchiveTarget {
    /// The archive name for a run at `generated_at`, e.g. `results_20250506_1430`.
    pub fn for_run(results_dir: &Path, generated_at: &DateTime<Utc>) -> Self {
        Self {
            paths: OutputPaths::new(results_dir, &archive_stem(generated_at)),
        }
    }

    /// Like [`ArchiveTarget::for_run`], but never points at existing files.
    ///
    /// A second run within the same minute gets `results_20250506_1430_2`,
    /// a third `_3`, and so on, so earlier archives are never replaced.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Io`] when the directory cannot be inspected.
    pub async fn reserve(
        results_dir: &Path,
        generated_at: &DateTime<Utc>,
    ) -> Result<Self, PersistenceError> {
        let base = archive_stem(generated_at);
        let mut n = 1usize;
        loop {
            let stem = if n == 1 { base.clone() } else { format!("{base}_{n}") };
            let paths = OutputPaths::new(results_dir, &stem);
            if !exists(&paths.json).await? && !exists(&paths.csv).await? {
                if n > 1 {
                    warn!(%stem, "Archive for this minute already exists; using a suffixed name");
                }
                return Ok(Self { paths });
            }
            n += 1;
        }
    }

    /// Destination files of this archive.
    pub fn paths(&self) -> &OutputPaths {
        &self.paths
    }
}

async fn exists(path: &Path) -> Result<bool, PersistenceError> {
    fs::try_exists(path)
        .await
        .map_err(|e| PersistenceError::io(path, e))
}

/// The mutable `latest.*` slot.
///
/// Only [`write_result_set`] writes it, and it needs `&mut` access to do so.
#[derive(Debug)]
pub struct LatestPointer {
    paths: OutputPaths,
}

impl LatestPointer {
    pub fn new(results_dir: &Path) -> Self {
        Self {
            paths: OutputPaths::new(results_dir, LATEST_STEM),
        }
    }

    pub fn paths(&self) -> &OutputPaths {
        &self.paths
    }
}

/// Persist `result_set` to its archive files, then to the latest pointer.
///
/// # Arguments
///
/// * `result_set` - The run's output
/// * `archive` - Where the immutable snapshot goes
/// * `latest` - The pointer to overwrite once the archive is on disk
///
/// Both payloads are rendered once, so the archive and the latest file hold
/// identical bytes.
///
/// # Errors
///
/// Any rendering or write failure is returned and is fatal to the run. A
/// failure before the latest files are touched leaves them as they were.
#[instrument(level = "info", skip_all, fields(count = result_set.count, archive = %archive.paths.json.display()))]
pub async fn write_result_set(
    result_set: &ResultSet,
    archive: &ArchiveTarget,
    latest: &mut LatestPointer,
) -> Result<(), PersistenceError> {
    let json = json::render(result_set)?;
    let csv = tabular::render(result_set)?;

    write_atomic(&archive.paths.json, &json).await?;
    write_atomic(&archive.paths.csv, &csv).await?;
    info!(json = %archive.paths.json.display(), csv = %archive.paths.csv.display(), "Wrote archive files");

    write_atomic(&latest.paths.json, &json).await?;
    write_atomic(&latest.paths.csv, &csv).await?;
    info!(json = %latest.paths.json.display(), "Updated latest pointer");

    Ok(())
}
