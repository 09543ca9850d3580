use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use sweep_rs::notifier::{report_outcome, HeadlessNotifier, Notifier};
use sweep_rs::tui::TuiNotifier;
use sweep_rs::{logging, pipeline, platform, LocalFileSystem, SweepConfig};
use tracing::{info, warn};

/// Move the downloads folder into the trash, then empty the trash.
///
/// All locations and retry settings are fixed; there are no options.
#[derive(Parser, Debug)]
#[command(name = "sweep-rs", version, about)]
struct Cli {}

fn main() -> Result<ExitCode> {
    let _cli = Cli::parse();

    let config = SweepConfig::detect().context("Failed to resolve sweep locations")?;
    logging::init(&config).context("Failed to set up logging")?;
    info!("Sweep started: {:?}", config);

    if let Err(e) = platform::keep_awake() {
        warn!("Could not keep the machine awake: {}", e);
    }

    let report = pipeline::run(&LocalFileSystem, &config);
    let outcome = report.outcome();

    let mut notifier: Box<dyn Notifier> = if io::stdout().is_terminal() {
        Box::new(TuiNotifier)
    } else {
        Box::new(HeadlessNotifier)
    };
    report_outcome(notifier.as_mut(), &outcome, &config, platform::open_directory);

    info!("Sweep finished: {:?}", outcome.kind());
    Ok(ExitCode::from(outcome.exit_code()))
}
