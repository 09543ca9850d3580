use crate::error::{Result, SweepError};
use crate::fs_ops::Access;
use crate::logging::forward_stderr;
use std::fs::{self, Metadata};
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::info;

/// Start a helper that keeps the machine awake until this process exits.
///
/// The helper watches our pid and quits on its own, so nothing is kept
/// around to stop it.
pub fn keep_awake() -> Result<()> {
    let pid = std::process::id().to_string();
    let mut command = keep_awake_command(&pid);
    let child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    info!("Keep-awake helper started (pid {})", child.id());
    Ok(())
}

#[cfg(target_os = "macos")]
fn keep_awake_command(pid: &str) -> Command {
    let mut command = Command::new("caffeinate");
    command.args(["-i", "-w", pid]);
    command
}

#[cfg(not(target_os = "macos"))]
fn keep_awake_command(pid: &str) -> Command {
    let pid_arg = format!("--pid={pid}");
    let mut command = Command::new("systemd-inhibit");
    command.args([
        "--what=idle:sleep",
        "--who=sweep-rs",
        "--why=Sweeping downloads into the trash",
        "tail",
        pid_arg.as_str(),
        "-f",
        "/dev/null",
    ]);
    command
}

/// Add write bits to one entry. Directories also get search bits.
pub fn make_writable(path: &Path, metadata: &Metadata, access: Access) -> io::Result<()> {
    let mode = metadata.permissions().mode();
    let wanted = match (access, metadata.is_dir()) {
        (Access::Owner, true) => 0o700,
        (Access::Owner, false) => 0o200,
        (Access::Everyone, true) => 0o777,
        (Access::Everyone, false) => 0o666,
    };
    if mode & wanted == wanted {
        return Ok(());
    }
    fs::set_permissions(path, fs::Permissions::from_mode(mode | wanted))
}

#[cfg(target_os = "macos")]
pub fn clear_immutable_flags(path: &Path) -> io::Result<()> {
    let user = run_tool("chflags", &["-R", "nouchg"], path);
    // Clearing schg needs root; a failure here is expected for normal users.
    if let Err(e) = run_tool("chflags", &["-R", "noschg"], path) {
        tracing::debug!("noschg on {}: {}", path.display(), e);
    }
    user
}

#[cfg(target_os = "linux")]
pub fn clear_immutable_flags(path: &Path) -> io::Result<()> {
    run_tool("chattr", &["-R", "-i"], path)
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
pub fn clear_immutable_flags(path: &Path) -> io::Result<()> {
    tracing::debug!("No immutable flag tool for this platform, skipping {}", path.display());
    Ok(())
}

/// Run a flag tool on `path`, sending its stderr to the diagnostic log.
#[cfg(any(target_os = "macos", target_os = "linux"))]
fn run_tool(program: &str, args: &[&str], path: &Path) -> io::Result<()> {
    let output = Command::new(program).args(args).arg(path).output()?;
    forward_stderr(program, &output.stderr);
    if output.status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("{program} exited with {}", output.status)))
    }
}

/// Show a directory in the desktop file manager.
pub fn open_directory(path: &Path) -> Result<()> {
    let program = if cfg!(target_os = "macos") { "open" } else { "xdg-open" };
    let output = Command::new(program)
        .arg(path)
        .output()
        .map_err(|e| SweepError::Collaborator(format!("{program}: {e}")))?;
    forward_stderr(program, &output.stderr);

    if output.status.success() {
        Ok(())
    } else {
        Err(SweepError::Collaborator(format!(
            "{program} could not open {} ({})",
            path.display(),
            output.status
        )))
    }
}
