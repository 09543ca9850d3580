use crate::error::{Result, SweepError};
use std::fmt;
use std::path::PathBuf;

/// One retry-bounded step of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Move,
    PurgePrimary,
    PurgeSecondary,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Move => "move",
            Phase::PurgePrimary => "local trash purge",
            Phase::PurgeSecondary => "secondary trash purge",
        };
        f.write_str(label)
    }
}

/// Result of a single phase
#[derive(Debug, Clone)]
pub struct PhaseReport {
    pub phase: Phase,
    pub directory: PathBuf,
    /// Entries found before the first attempt
    pub initial_count: usize,
    pub attempts: u32,
    /// Entries still present after the last verification
    pub remaining: Vec<PathBuf>,
}

impl PhaseReport {
    pub fn succeeded(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn into_result(self) -> Result<Self> {
        if self.succeeded() {
            Ok(self)
        } else {
            Err(SweepError::ExhaustedRetries {
                phase: self.phase,
                remaining: self.remaining,
            })
        }
    }

    pub fn display_status(&self) -> String {
        let mut status = vec![
            format!("Phase: {}", self.phase),
            format!("Directory: {}", self.directory.display()),
            format!("Entries found: {}", self.initial_count),
            format!("Attempts: {}", self.attempts),
        ];

        if !self.succeeded() {
            status.push(format!("Entries remaining: {}", self.remaining.len()));
        }

        status.join("\n")
    }
}

/// Result of purging every trash directory that exists
#[derive(Debug, Clone)]
pub struct PurgeReport {
    pub primary: PhaseReport,
    /// `None` when the secondary trash is not configured or not on disk
    pub secondary: Option<PhaseReport>,
}

impl PurgeReport {
    pub fn succeeded(&self) -> bool {
        self.reports().all(PhaseReport::succeeded)
    }

    pub fn reports(&self) -> impl Iterator<Item = &PhaseReport> {
        std::iter::once(&self.primary).chain(self.secondary.as_ref())
    }
}

/// Everything a run did, in order
#[derive(Debug, Clone)]
pub struct RunReport {
    pub moved: PhaseReport,
    pub purged: PurgeReport,
}

impl RunReport {
    pub fn outcome(&self) -> RunOutcome {
        RunOutcome {
            move_succeeded: self.moved.succeeded(),
            purge_succeeded: self.purged.succeeded(),
        }
    }

    pub fn phases(&self) -> impl Iterator<Item = &PhaseReport> {
        std::iter::once(&self.moved).chain(self.purged.reports())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    FullSuccess,
    PartialSuccess,
    Failure,
}

/// The two verified results that drive the final notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub move_succeeded: bool,
    pub purge_succeeded: bool,
}

impl RunOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match (self.move_succeeded, self.purge_succeeded) {
            (true, true) => OutcomeKind::FullSuccess,
            (false, false) => OutcomeKind::Failure,
            _ => OutcomeKind::PartialSuccess,
        }
    }

    /// 0 only when both phases verified clean.
    pub fn exit_code(&self) -> u8 {
        match self.kind() {
            OutcomeKind::FullSuccess => 0,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(phase: Phase, remaining: &[&str]) -> PhaseReport {
        PhaseReport {
            phase,
            directory: PathBuf::from("/trash"),
            initial_count: 4,
            attempts: 1,
            remaining: remaining.iter().map(PathBuf::from).collect(),
        }
    }

    #[test]
    fn test_outcome_kinds() {
        let full = RunOutcome { move_succeeded: true, purge_succeeded: true };
        let partial = RunOutcome { move_succeeded: false, purge_succeeded: true };
        let failed = RunOutcome { move_succeeded: false, purge_succeeded: false };

        assert_eq!(full.kind(), OutcomeKind::FullSuccess);
        assert_eq!(partial.kind(), OutcomeKind::PartialSuccess);
        assert_eq!(failed.kind(), OutcomeKind::Failure);
        assert_eq!(full.exit_code(), 0);
        assert_eq!(partial.exit_code(), 1);
        assert_eq!(failed.exit_code(), 1);
    }

    #[test]
    fn test_purge_report_needs_every_directory_clean() {
        let mut purged = PurgeReport {
            primary: report(Phase::PurgePrimary, &[]),
            secondary: None,
        };
        assert!(purged.succeeded());

        purged.secondary = Some(report(Phase::PurgeSecondary, &["/cloud/.Trash/x"]));
        assert!(!purged.succeeded());
        assert_eq!(purged.reports().count(), 2);
    }

    #[test]
    fn test_into_result_carries_remaining_paths() {
        let err = report(Phase::Move, &["/src/stuck.bin"]).into_result().unwrap_err();
        match err {
            SweepError::ExhaustedRetries { phase, remaining } => {
                assert_eq!(phase, Phase::Move);
                assert_eq!(remaining, vec![PathBuf::from("/src/stuck.bin")]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_display_status() {
        let status = report(Phase::PurgeSecondary, &["/a", "/b"]).display_status();
        assert!(status.contains("Phase: secondary trash purge"));
        assert!(status.contains("Entries found: 4"));
        assert!(status.contains("Entries remaining: 2"));

        let clean = report(Phase::Move, &[]).display_status();
        assert!(!clean.contains("Entries remaining"));
    }
}
