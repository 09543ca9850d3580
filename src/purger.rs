//! Empties the trash directories.

use crate::config::SweepConfig;
use crate::fs_ops::{Access, Entry, FileSystem};
use crate::outcome::{Phase, PhaseReport, PurgeReport};
use crate::verify;
use std::cmp::Reverse;
use std::path::Path;
use std::thread;
use tracing::{debug, error, info, warn};

/// Purge the primary trash, then the secondary one if it is on disk.
pub fn purge_trash(fs: &dyn FileSystem, config: &SweepConfig) -> PurgeReport {
    let primary = purge_directory(fs, &config.primary_trash, Phase::PurgePrimary, config);

    let secondary = match &config.secondary_trash {
        Some(dir) if fs.exists(dir) => {
            Some(purge_directory(fs, dir, Phase::PurgeSecondary, config))
        }
        Some(dir) => {
            info!("Secondary trash {} not present, skipping", dir.display());
            None
        }
        None => None,
    };

    PurgeReport { primary, secondary }
}

/// Delete everything below `dir`, escalating to unlock on retries.
pub fn purge_directory(
    fs: &dyn FileSystem,
    dir: &Path,
    phase: Phase,
    config: &SweepConfig,
) -> PhaseReport {
    let initial_count = fs.list_entries(dir).len();
    info!("Purging {} ({} entries)", dir.display(), initial_count);

    let (files, dirs) = delete_entries(fs, dir);
    debug!("Deleted {} files and {} directories", files, dirs);

    let mut attempts = 1;
    let mut remaining = verify::remaining_entries(fs, dir);
    while !remaining.is_empty() && attempts < config.max_attempts {
        attempts += 1;
        info!(
            "Retrying {} in {:?} (attempt {}/{})",
            phase, config.retry_delay, attempts, config.max_attempts
        );
        thread::sleep(config.retry_delay);
        verify::log_remaining(phase, dir, &remaining);

        unlock(fs, dir);
        delete_entries(fs, dir);
        remaining = verify::remaining_entries(fs, dir);
    }

    let report = PhaseReport {
        phase,
        directory: dir.to_path_buf(),
        initial_count,
        attempts,
        remaining,
    };
    if report.succeeded() {
        info!("{} is empty after {} attempt(s)", dir.display(), attempts);
    } else {
        error!("{} failed: {} is not empty", phase, dir.display());
        verify::log_remaining(phase, dir, &report.remaining);
    }
    report
}

/// Files first, then directories deepest-first. Returns what was removed.
fn delete_entries(fs: &dyn FileSystem, dir: &Path) -> (usize, usize) {
    let (mut dirs, files): (Vec<Entry>, Vec<Entry>) =
        fs.list_entries(dir).into_iter().partition(Entry::is_dir);
    let mut files_deleted = 0;
    let mut dirs_deleted = 0;

    for file in &files {
        match fs.remove_entry(&file.path) {
            Ok(()) => files_deleted += 1,
            Err(e) => debug!("Failed to delete file {}: {}", file.path.display(), e),
        }
    }

    dirs.sort_by_key(|d| Reverse(d.depth()));
    for entry in &dirs {
        match fs.remove_entry(&entry.path) {
            Ok(()) => dirs_deleted += 1,
            Err(e) => debug!("Failed to delete directory {}: {}", entry.path.display(), e),
        }
    }

    (files_deleted, dirs_deleted)
}

fn unlock(fs: &dyn FileSystem, dir: &Path) {
    if let Err(e) = fs.clear_immutable_flags(dir) {
        warn!("Could not clear immutable flags in {}: {}", dir.display(), e);
    }
    if let Err(e) = fs.set_writable(dir, Access::Everyone) {
        warn!("Could not relax permissions in {}: {}", dir.display(), e);
    }
}
