//! Everything that talks to the external `ffmpeg` binary.
//!
//! The filter graph and argument list are pure functions of the request; only
//! [`process::run`] has side effects.

/// `-filter_complex` graph construction.
pub mod filter;
/// The ffmpeg command line for one request.
pub mod invocation;
/// Child-process execution with output capture and an optional deadline.
pub mod process;

/// Return `true` when `program -version` runs and exits successfully.
pub fn is_tool_available(program: impl AsRef<std::ffi::OsStr>) -> bool {
    std::process::Command::new(program)
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
