//! Moves the contents of the source directory into the primary trash.

use crate::config::{OverwritePolicy, SweepConfig};
use crate::fs_ops::{Access, Entry, FileSystem, MoveOutcome};
use crate::outcome::{Phase, PhaseReport};
use crate::verify;
use std::cmp::Reverse;
use std::path::Path;
use std::thread;
use tracing::{debug, error, info, warn};

/// Name prefixes of metadata files that plain enumeration tends to trip
/// over: dotfiles (`.DS_Store`, AppleDouble `._*`) and Office lock files.
const ARTIFACT_PREFIXES: [&str; 2] = [".", "~$"];
/// Finder custom-icon file
const ICON_FILE: &str = "Icon\r";

pub fn is_metadata_artifact(path: &Path) -> bool {
    let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
        return false;
    };
    name == ICON_FILE || ARTIFACT_PREFIXES.iter().any(|p| name.starts_with(p))
}

/// Empty `config.source` into `config.primary_trash`, keeping relative
/// structure, with up to `config.max_attempts` verified attempts.
pub fn move_to_trash(fs: &dyn FileSystem, config: &SweepConfig) -> PhaseReport {
    let source = &config.source;
    let trash = &config.primary_trash;
    info!("Moving {} into {}", source.display(), trash.display());

    let entries = fs.list_entries(source);
    let initial_count = entries.len();
    info!("Found {} entries to move", initial_count);

    if let Err(e) = fs.set_writable(source, Access::Owner) {
        warn!("Could not grant write access on {}: {}", source.display(), e);
    }

    let moved = relocate(fs, source, trash, &entries, config.overwrite);
    debug!("First pass moved {} entries", moved);

    let mut attempts = 1;
    let mut remaining = verify::remaining_entries(fs, source);
    while !remaining.is_empty() && attempts < config.max_attempts {
        attempts += 1;
        info!(
            "Retrying move in {:?} (attempt {}/{})",
            config.retry_delay, attempts, config.max_attempts
        );
        thread::sleep(config.retry_delay);
        verify::log_remaining(Phase::Move, source, &remaining);

        fallback(fs, source, trash, config.overwrite);
        remaining = verify::remaining_entries(fs, source);
    }

    let report = PhaseReport {
        phase: Phase::Move,
        directory: source.clone(),
        initial_count,
        attempts,
        remaining,
    };
    if report.succeeded() {
        info!("{} is empty after {} attempt(s)", source.display(), attempts);
    } else {
        error!(
            "Giving up on {} after {} attempts",
            source.display(),
            attempts
        );
        verify::log_remaining(Phase::Move, source, &report.remaining);
    }
    report
}

/// First pass: files one by one, then directories deepest-first.
fn relocate(
    fs: &dyn FileSystem,
    source: &Path,
    trash: &Path,
    entries: &[Entry],
    policy: OverwritePolicy,
) -> usize {
    let (mut dirs, files): (Vec<&Entry>, Vec<&Entry>) = entries.iter().partition(|e| e.is_dir());
    let mut moved = 0;

    for file in files {
        if move_one(fs, source, trash, &file.path, policy) {
            moved += 1;
        }
    }

    // Directories always merge into an existing destination: the files
    // inside them were already placed under the active policy.
    dirs.sort_by_key(|d| Reverse(d.depth()));
    for dir in dirs {
        let Ok(relative) = dir.path.strip_prefix(source) else {
            continue;
        };
        match fs.move_entry(&dir.path, &trash.join(relative), OverwritePolicy::NoClobber) {
            Ok(MoveOutcome::Moved) => moved += 1,
            Ok(MoveOutcome::Skipped) => match fs.remove_empty_dir(&dir.path) {
                Ok(()) => moved += 1,
                Err(e) => debug!("{} not empty yet: {}", dir.path.display(), e),
            },
            Err(e) => debug!("Failed to move {}: {}", dir.path.display(), e),
        }
    }

    moved
}

fn move_one(
    fs: &dyn FileSystem,
    source: &Path,
    trash: &Path,
    path: &Path,
    policy: OverwritePolicy,
) -> bool {
    let Ok(relative) = path.strip_prefix(source) else {
        return false;
    };
    let dest = trash.join(relative);
    match fs.move_entry(path, &dest, policy) {
        Ok(MoveOutcome::Moved) => {
            debug!("Moved {}", path.display());
            true
        }
        Ok(MoveOutcome::Skipped) => {
            warn!(
                "{} already exists, leaving {} in place",
                dest.display(),
                path.display()
            );
            false
        }
        Err(e) => {
            debug!("Failed to move {}: {}", path.display(), e);
            false
        }
    }
}

/// Retry pass: bulk copy, sweep empty directories, then the metadata files.
fn fallback(fs: &dyn FileSystem, source: &Path, trash: &Path, policy: OverwritePolicy) {
    match fs.copy_entry_recursive(source, trash, policy) {
        Ok(stats) => info!(
            "Bulk copy: {} copied, {} kept in place, {} failed",
            stats.copied, stats.skipped, stats.failed
        ),
        Err(e) => warn!("Bulk copy of {} failed: {}", source.display(), e),
    }

    remove_empty_dirs(fs, source);

    let artifacts: Vec<Entry> = fs
        .list_entries(source)
        .into_iter()
        .filter(|e| !e.is_dir() && is_metadata_artifact(&e.path))
        .collect();
    if !artifacts.is_empty() {
        info!("Retrying {} metadata files", artifacts.len());
        for artifact in &artifacts {
            move_one(fs, source, trash, &artifact.path, policy);
        }
        remove_empty_dirs(fs, source);
    }
}

fn remove_empty_dirs(fs: &dyn FileSystem, root: &Path) {
    let mut dirs: Vec<Entry> = fs.list_entries(root).into_iter().filter(Entry::is_dir).collect();
    dirs.sort_by_key(|d| Reverse(d.depth()));
    for dir in dirs {
        if fs.remove_empty_dir(&dir.path).is_ok() {
            debug!("Removed empty directory {}", dir.path.display());
        }
    }
}
