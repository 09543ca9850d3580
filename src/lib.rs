//! Sweep-rs - downloads-to-trash maintenance library
//!
//! Moves everything out of a source directory into the trash, then empties
//! the trash (and a cloud trash, when present). Every phase retries a
//! bounded number of times and is judged only by verifying that its
//! directory ended up empty.

pub mod config;
pub mod error;
pub mod fs_ops;
pub mod logging;
pub mod mover;
pub mod notifier;
pub mod outcome;
pub mod pipeline;
pub mod platform;
pub mod purger;
pub mod tui;
pub mod verify;

pub use config::{OverwritePolicy, SweepConfig};
pub use error::{Result, SweepError};
pub use fs_ops::{FileSystem, LocalFileSystem};
pub use notifier::{report_outcome, HeadlessNotifier, Notifier};
pub use outcome::{OutcomeKind, Phase, PhaseReport, PurgeReport, RunOutcome, RunReport};
