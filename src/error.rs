use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::outcome::Phase;

/// Custom error types for the sweep-rs application
#[derive(Error, Debug)]
pub enum SweepError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Could not determine the home directory")]
    NoHomeDirectory,

    #[error("{phase} still has {} entries after all attempts", .remaining.len())]
    ExhaustedRetries {
        phase: Phase,
        remaining: Vec<PathBuf>,
    },

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("Collaborator failed: {0}")]
    Collaborator(String),
}

/// Result type alias for sweep error handling
pub type Result<T> = std::result::Result<T, SweepError>;
