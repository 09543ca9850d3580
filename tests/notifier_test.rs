use std::path::{Path, PathBuf};
use sweep_rs::notifier::{report_outcome, Notifier, BUTTON_OK, BUTTON_OPEN};
use sweep_rs::{RunOutcome, SweepConfig, SweepError};

/// Remembers every dialog and answers with a fixed button
#[derive(Default)]
struct RecordingNotifier {
    answer: Option<String>,
    dialogs: Vec<(String, String, Vec<String>)>,
    infos: Vec<(String, String)>,
}

impl RecordingNotifier {
    fn answering(button: &str) -> Self {
        Self {
            answer: Some(button.to_string()),
            ..Default::default()
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, title: &str, message: &str, buttons: &[&str]) -> Option<String> {
        self.dialogs.push((
            title.to_string(),
            message.to_string(),
            buttons.iter().map(|b| b.to_string()).collect(),
        ));
        self.answer.clone()
    }

    fn notify_info(&mut self, title: &str, message: &str) {
        self.infos.push((title.to_string(), message.to_string()));
    }
}

fn config() -> SweepConfig {
    SweepConfig::new("/home/user/Downloads", "/home/user/.Trash")
}

fn outcome(move_succeeded: bool, purge_succeeded: bool) -> RunOutcome {
    RunOutcome {
        move_succeeded,
        purge_succeeded,
    }
}

#[test]
fn test_full_success_offers_only_ok() {
    let mut notifier = RecordingNotifier::answering(BUTTON_OK);
    let mut opened = false;

    report_outcome(&mut notifier, &outcome(true, true), &config(), |_: &Path| {
        opened = true;
        Ok(())
    });

    assert_eq!(notifier.dialogs.len(), 1);
    assert_eq!(notifier.dialogs[0].0, "Sweep complete");
    assert_eq!(notifier.dialogs[0].2, vec![BUTTON_OK.to_string()]);
    assert!(!opened);
    assert!(notifier.infos.is_empty());
}

#[test]
fn test_failed_move_opens_source() {
    let mut notifier = RecordingNotifier::answering(BUTTON_OPEN);
    let mut opened: Option<PathBuf> = None;

    report_outcome(&mut notifier, &outcome(false, true), &config(), |path: &Path| {
        opened = Some(path.to_path_buf());
        Ok(())
    });

    assert_eq!(notifier.dialogs.len(), 1);
    assert_eq!(
        notifier.dialogs[0].2,
        vec![BUTTON_OK.to_string(), BUTTON_OPEN.to_string()]
    );
    assert_eq!(opened, Some(PathBuf::from("/home/user/Downloads")));
    assert!(notifier.infos.is_empty());
}

#[test]
fn test_open_failure_sends_second_notice() {
    let mut notifier = RecordingNotifier::answering(BUTTON_OPEN);
    let mut opened: Option<PathBuf> = None;

    report_outcome(&mut notifier, &outcome(true, false), &config(), |path: &Path| {
        opened = Some(path.to_path_buf());
        Err(SweepError::Collaborator("no file manager".to_string()))
    });

    assert_eq!(opened, Some(PathBuf::from("/home/user/.Trash")));
    assert_eq!(notifier.dialogs.len(), 1);
    assert_eq!(notifier.infos.len(), 1);
    assert_eq!(notifier.infos[0].0, "Could not open folder");
    assert!(notifier.infos[0].1.contains("no file manager"));
}

#[test]
fn test_dismissed_dialog_opens_nothing() {
    let mut notifier = RecordingNotifier::default();
    let mut opened = false;

    report_outcome(&mut notifier, &outcome(false, false), &config(), |_: &Path| {
        opened = true;
        Ok(())
    });

    assert_eq!(notifier.dialogs[0].0, "Sweep failed");
    assert!(!opened);
}
