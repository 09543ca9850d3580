use crate::error::{Result, SweepError};
use crate::fs_ops::Access;
use crate::logging::forward_stderr;
use std::ffi::OsStr;
use std::fs::{self, Metadata};
use std::io;
use std::os::windows::ffi::OsStrExt;
use std::path::Path;
use std::process::Command;
use std::ptr;
use tracing::info;
use winapi::um::shellapi::ShellExecuteW;
use winapi::um::winbase::SetThreadExecutionState;
use winapi::um::winnt::{ES_CONTINUOUS, ES_SYSTEM_REQUIRED};
use winapi::um::winuser::SW_SHOWNORMAL;

/// Keep the system awake for the lifetime of this process.
pub fn keep_awake() -> Result<()> {
    // The execution state is tied to this thread and is dropped when the
    // process exits.
    let previous = unsafe { SetThreadExecutionState(ES_CONTINUOUS | ES_SYSTEM_REQUIRED) };
    if previous == 0 {
        return Err(SweepError::Io(io::Error::last_os_error()));
    }
    info!("System sleep suspended for this run");
    Ok(())
}

/// Windows only knows the read-only attribute, so access is ignored.
pub fn make_writable(path: &Path, metadata: &Metadata, _access: Access) -> io::Result<()> {
    let mut permissions = metadata.permissions();
    if !permissions.readonly() {
        return Ok(());
    }
    #[allow(clippy::permissions_set_readonly_false)]
    permissions.set_readonly(false);
    fs::set_permissions(path, permissions)
}

/// Clear the read-only and system attributes below `path`.
pub fn clear_immutable_flags(path: &Path) -> io::Result<()> {
    let output = Command::new("attrib")
        .args(["-R", "-S", "/S", "/D"])
        .arg(path.join("*"))
        .output()?;
    forward_stderr("attrib", &output.stderr);
    if output.status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("attrib exited with {}", output.status)))
    }
}

fn wide(value: &OsStr) -> Vec<u16> {
    value.encode_wide().chain(std::iter::once(0)).collect()
}

/// Show a directory in Explorer.
pub fn open_directory(path: &Path) -> Result<()> {
    let operation = wide(OsStr::new("open"));
    let target = wide(path.as_os_str());
    let result = unsafe {
        ShellExecuteW(
            ptr::null_mut(),
            operation.as_ptr(),
            target.as_ptr(),
            ptr::null(),
            ptr::null(),
            SW_SHOWNORMAL,
        )
    };
    // ShellExecuteW reports success with a value greater than 32.
    if result as isize > 32 {
        Ok(())
    } else {
        Err(SweepError::Collaborator(format!(
            "Explorer could not open {} (code {})",
            path.display(),
            result as isize
        )))
    }
}
