//! Log files for a run.
//!
//! Two files are truncated at start-up: the run log, which receives every
//! timestamped event, and the diagnostic log, which receives the raw stderr
//! of the helper tools we spawn.

use crate::config::SweepConfig;
use crate::error::{Result, SweepError};
use std::fs::{self, File};
use std::io::{self, Write};
use std::sync::Mutex;
use tracing::Subscriber;
use tracing_subscriber::filter::{filter_fn, Directive, EnvFilter};
use tracing_subscriber::{fmt, prelude::*};

/// Target used for helper stderr lines, routed to the diagnostic log only.
pub const STDERR_TARGET: &str = "sweep_rs::stderr";

/// Warnings the desktop toolkit prints on every dialog. They carry no
/// information about the run.
pub const BENIGN_STDERR: [&str; 2] = [
    "IMKClient",
    "TSM AdjustCapsLockLEDForKeyTransitionHandling",
];

pub fn is_benign(line: &str) -> bool {
    BENIGN_STDERR.iter().any(|noise| line.contains(noise))
}

/// Writer for the diagnostic log that drops benign toolkit noise.
pub struct DiagnosticWriter<W: Write> {
    inner: W,
}

impl<W: Write> DiagnosticWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for DiagnosticWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        for line in text.split_inclusive('\n') {
            if !is_benign(line) {
                self.inner.write_all(line.as_bytes())?;
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Pass a child's stderr through to the diagnostic log, one event per line.
pub fn forward_stderr(program: &str, stderr: &[u8]) {
    for line in String::from_utf8_lossy(stderr).lines() {
        let line = line.trim_end();
        if !line.is_empty() {
            tracing::warn!(target: STDERR_TARGET, "{}: {}", program, line);
        }
    }
}

/// Create the log directory and truncate both log files.
pub fn open_log_files(config: &SweepConfig) -> Result<(File, File)> {
    fs::create_dir_all(&config.log_dir)?;
    let run_log = File::create(config.run_log_path())?;
    let diagnostic_log = File::create(config.diagnostic_log_path())?;
    Ok((run_log, diagnostic_log))
}

/// Subscriber writing events that pass `filter` to the run log and helper
/// stderr to the diagnostic log, never both.
pub fn build_subscriber(
    run_log: File,
    diagnostic_log: File,
    filter: EnvFilter,
) -> Result<impl Subscriber + Send + Sync + 'static> {
    let directive: Directive = format!("{STDERR_TARGET}=off")
        .parse()
        .map_err(|e| SweepError::Logging(format!("{e}")))?;

    let run_layer = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(run_log))
        .with_filter(filter.add_directive(directive));

    let diagnostic_layer = fmt::layer()
        .without_time()
        .with_ansi(false)
        .with_level(false)
        .with_target(false)
        .with_writer(Mutex::new(DiagnosticWriter::new(diagnostic_log)))
        .with_filter(filter_fn(|meta| meta.target() == STDERR_TARGET));

    Ok(tracing_subscriber::registry()
        .with(run_layer)
        .with(diagnostic_layer))
}

/// Truncate both log files and install the global subscriber.
///
/// `RUST_LOG` overrides the default `info` level of the run log.
pub fn init(config: &SweepConfig) -> Result<()> {
    let (run_log, diagnostic_log) = open_log_files(config)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    build_subscriber(run_log, diagnostic_log, filter)?
        .try_init()
        .map_err(|e| SweepError::Logging(e.to_string()))?;

    tracing::info!(
        "Logging to {} (diagnostics in {})",
        config.run_log_path().display(),
        config.diagnostic_log_path().display()
    );
    Ok(())
}
