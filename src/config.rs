use crate::error::{Result, SweepError};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Attempts per phase, the first pass included.
pub const MAX_ATTEMPTS: u32 = 3;
/// Pause between two attempts of the same phase.
pub const RETRY_DELAY: Duration = Duration::from_secs(10);

pub const RUN_LOG_FILE: &str = "sweep.log";
pub const DIAGNOSTIC_LOG_FILE: &str = "sweep.stderr.log";

/// What to do when the destination of a move already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwritePolicy {
    /// Leave the destination alone and keep the source entry in place
    #[default]
    NoClobber,
    /// Replace the destination with the source entry
    Overwrite,
}

/// Paths and retry tuning for one run. Built once in `main`, then borrowed.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    pub source: PathBuf,
    pub primary_trash: PathBuf,
    pub secondary_trash: Option<PathBuf>,
    pub log_dir: PathBuf,
    pub max_attempts: u32,
    pub retry_delay: Duration,
    pub overwrite: OverwritePolicy,
}

impl SweepConfig {
    pub fn new(source: impl Into<PathBuf>, primary_trash: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            primary_trash: primary_trash.into(),
            secondary_trash: None,
            log_dir: std::env::temp_dir().join("sweep-rs"),
            max_attempts: MAX_ATTEMPTS,
            retry_delay: RETRY_DELAY,
            overwrite: OverwritePolicy::default(),
        }
    }

    /// Resolve the fixed locations for the current user.
    pub fn detect() -> Result<Self> {
        let home = dirs::home_dir().ok_or(SweepError::NoHomeDirectory)?;
        let source = dirs::download_dir().unwrap_or_else(|| home.join("Downloads"));

        let mut config = Self::new(source, primary_trash_dir(&home))
            .with_log_dir(log_dir(&home));
        if let Some(secondary) = secondary_trash_dir(&home) {
            config = config.with_secondary_trash(secondary);
        }
        Ok(config)
    }

    pub fn with_secondary_trash(mut self, path: impl Into<PathBuf>) -> Self {
        self.secondary_trash = Some(path.into());
        self
    }

    pub fn with_log_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_dir = path.into();
        self
    }

    pub fn with_retry(mut self, max_attempts: u32, delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_delay = delay;
        self
    }

    pub fn with_overwrite(mut self, policy: OverwritePolicy) -> Self {
        self.overwrite = policy;
        self
    }

    pub fn run_log_path(&self) -> PathBuf {
        self.log_dir.join(RUN_LOG_FILE)
    }

    pub fn diagnostic_log_path(&self) -> PathBuf {
        self.log_dir.join(DIAGNOSTIC_LOG_FILE)
    }
}

#[cfg(target_os = "macos")]
fn primary_trash_dir(home: &Path) -> PathBuf {
    home.join(".Trash")
}

#[cfg(not(target_os = "macos"))]
fn primary_trash_dir(home: &Path) -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| home.join(".local").join("share"))
        .join("Trash")
        .join("files")
}

/// iCloud Drive keeps its own trash next to the synced documents.
#[cfg(target_os = "macos")]
fn secondary_trash_dir(home: &Path) -> Option<PathBuf> {
    Some(
        home.join("Library")
            .join("Mobile Documents")
            .join("com~apple~CloudDocs")
            .join(".Trash"),
    )
}

#[cfg(not(target_os = "macos"))]
fn secondary_trash_dir(_home: &Path) -> Option<PathBuf> {
    None
}

#[cfg(target_os = "macos")]
fn log_dir(home: &Path) -> PathBuf {
    home.join("Library").join("Logs").join("sweep-rs")
}

#[cfg(not(target_os = "macos"))]
fn log_dir(home: &Path) -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| home.join(".local").join("share"))
        .join("sweep-rs")
        .join("logs")
}
