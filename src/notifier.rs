//! User-facing report at the end of a run.

use crate::config::SweepConfig;
use crate::error::Result;
use crate::outcome::{OutcomeKind, RunOutcome};
use std::path::Path;
use tracing::{info, warn};

pub const BUTTON_OK: &str = "OK";
pub const BUTTON_OPEN: &str = "Open Folder";

/// A modal dialog, or anything that can stand in for one.
pub trait Notifier {
    /// Show a message with buttons. Returns the label of the chosen
    /// button, or `None` if the dialog was dismissed.
    fn notify(&mut self, title: &str, message: &str, buttons: &[&str]) -> Option<String>;

    /// Show a message with a single acknowledgement button.
    fn notify_info(&mut self, title: &str, message: &str);
}

/// Writes notifications to the log and always picks the first button.
#[derive(Debug, Default)]
pub struct HeadlessNotifier;

impl Notifier for HeadlessNotifier {
    fn notify(&mut self, title: &str, message: &str, buttons: &[&str]) -> Option<String> {
        info!("[{}] {}", title, message);
        buttons.first().map(|b| b.to_string())
    }

    fn notify_info(&mut self, title: &str, message: &str) {
        info!("[{}] {}", title, message);
    }
}

/// Title and body for the final notification.
pub fn outcome_message(outcome: &RunOutcome, config: &SweepConfig) -> (&'static str, String) {
    let log = config.run_log_path();
    match outcome.kind() {
        OutcomeKind::FullSuccess => (
            "Sweep complete",
            format!(
                "{} was moved to the trash and the trash was emptied.",
                config.source.display()
            ),
        ),
        OutcomeKind::PartialSuccess if outcome.move_succeeded => (
            "Sweep partially complete",
            format!(
                "{} was moved to the trash, but the trash could not be emptied. See {}.",
                config.source.display(),
                log.display()
            ),
        ),
        OutcomeKind::PartialSuccess => (
            "Sweep partially complete",
            format!(
                "The trash was emptied, but some items in {} could not be moved. See {}.",
                config.source.display(),
                log.display()
            ),
        ),
        OutcomeKind::Failure => (
            "Sweep failed",
            format!(
                "Items in {} could not be moved and the trash could not be emptied. See {}.",
                config.source.display(),
                log.display()
            ),
        ),
    }
}

/// Notify the user once about `outcome`. When something was left behind the
/// dialog offers to open the folder holding it; if opening fails the user
/// gets a second, informational notice. Neither affects the outcome.
pub fn report_outcome<F>(
    notifier: &mut dyn Notifier,
    outcome: &RunOutcome,
    config: &SweepConfig,
    open: F,
) where
    F: FnOnce(&Path) -> Result<()>,
{
    let (title, message) = outcome_message(outcome, config);
    if outcome.kind() == OutcomeKind::FullSuccess {
        notifier.notify(title, &message, &[BUTTON_OK]);
        return;
    }

    let choice = notifier.notify(title, &message, &[BUTTON_OK, BUTTON_OPEN]);
    if choice.as_deref() != Some(BUTTON_OPEN) {
        return;
    }

    let folder = if outcome.move_succeeded {
        &config.primary_trash
    } else {
        &config.source
    };
    if let Err(e) = open(folder) {
        warn!("Opening {} failed: {}", folder.display(), e);
        notifier.notify_info(
            "Could not open folder",
            &format!("{} could not be opened: {}", folder.display(), e),
        );
    }
}
