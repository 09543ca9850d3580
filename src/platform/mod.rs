#[cfg(windows)]
pub mod windows;

#[cfg(not(windows))]
pub mod unix;

#[cfg(windows)]
pub use windows::{clear_immutable_flags, keep_awake, make_writable, open_directory};

#[cfg(not(windows))]
pub use unix::{clear_immutable_flags, keep_awake, make_writable, open_directory};
