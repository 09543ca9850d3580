//! Emptiness checks. A phase only counts as done when its directory
//! verifies empty; exit codes of individual operations are never trusted.

use crate::fs_ops::FileSystem;
use crate::outcome::Phase;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Everything still below `dir`. A missing directory has nothing left.
pub fn remaining_entries(fs: &dyn FileSystem, dir: &Path) -> Vec<PathBuf> {
    fs.list_entries(dir).into_iter().map(|e| e.path).collect()
}

pub fn is_empty(fs: &dyn FileSystem, dir: &Path) -> bool {
    fs.list_entries(dir).is_empty()
}

pub fn log_remaining(phase: Phase, dir: &Path, remaining: &[PathBuf]) {
    warn!(
        "{}: {} entries remain in {}",
        phase,
        remaining.len(),
        dir.display()
    );
    for path in remaining {
        warn!("  remaining: {}", path.display());
    }
}
