//! Where a finished run leaves its files.

use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::ArchiveError;

pub const RESULTS_DIR: &str = "RESULTS";
pub const HISTORY_DIR: &str = "History";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLayout {
    /// Normalized CSVs, `S-Bank_YNAB_<stamp>.csv`.
    pub results_dir: PathBuf,
    /// Original exports, `export_<stamp>.csv`.
    pub history_dir: PathBuf,
}

impl ArchiveLayout {
    /// The standard `RESULTS/` + `History/` layout under a working directory.
    pub fn under(work_dir: impl AsRef<Path>) -> Self {
        let work_dir = work_dir.as_ref();
        Self {
            results_dir: work_dir.join(RESULTS_DIR),
            history_dir: work_dir.join(HISTORY_DIR),
        }
    }

    pub fn results_path(&self, stamp: &str) -> PathBuf {
        self.results_dir.join(format!("S-Bank_YNAB_{stamp}.csv"))
    }

    pub fn history_path(&self, stamp: &str) -> PathBuf {
        self.history_dir.join(format!("export_{stamp}.csv"))
    }
}

/// File-name timestamp for one run.
pub fn run_stamp(now: DateTime<Local>) -> String {
    now.format("%Y-%m-%d_%H-%M-%S").to_string()
}

/// Move `from` to `to`, creating the destination directory. Falls back to
/// copy + remove when a rename is not possible (e.g. across filesystems).
pub fn move_file(from: &Path, to: &Path) -> Result<(), ArchiveError> {
    let wrap = |source: std::io::Error| ArchiveError::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(wrap)?;
    }

    info!(from = %from.display(), to = %to.display(), "moving file");
    if let Err(rename_err) = fs::rename(from, to) {
        if !from.exists() {
            return Err(wrap(rename_err));
        }
        warn!(error = %rename_err, "rename failed, copying instead");
        fs::copy(from, to).map_err(wrap)?;
        fs::remove_file(from).map_err(wrap)?;
    }
    Ok(())
}
