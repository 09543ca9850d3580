use crate::config::SweepConfig;
use crate::fs_ops::FileSystem;
use crate::mover;
use crate::outcome::RunReport;
use crate::purger;
use tracing::{error, info};

/// Move, then purge. Each phase is verified on its own and a failed move
/// does not stop the purge.
pub fn run(fs: &dyn FileSystem, config: &SweepConfig) -> RunReport {
    let moved = mover::move_to_trash(fs, config);
    let purged = purger::purge_trash(fs, config);
    let report = RunReport { moved, purged };

    for phase in report.phases() {
        match phase.clone().into_result() {
            Ok(phase) => info!("{}", phase.display_status().replace('\n', ", ")),
            Err(e) => error!("{}", e),
        }
    }
    report
}
