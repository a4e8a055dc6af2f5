use std::{
    io::Read,
    process::{Child, Command, ExitStatus},
    thread::JoinHandle,
    time::{Duration, Instant},
};

use anyhow::Context as _;

use crate::{
    encode::invocation::ExternalToolInvocation,
    foundation::error::{ComposeError, ComposeResult},
};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long to wait for output readers after a timed-out child has been killed.
/// A descendant that left the process group can keep the pipes open indefinitely.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Exit status and fully captured output of one finished child process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvocationResult {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl InvocationResult {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

type Drain = JoinHandle<std::io::Result<Vec<u8>>>;

fn spawn_drain<R: Read + Send + 'static>(mut stream: R) -> Drain {
    std::thread::spawn(move || {
        let mut bytes = Vec::new();
        stream.read_to_end(&mut bytes)?;
        Ok(bytes)
    })
}

/// Join `handle` if it finishes within `grace`; otherwise leave the thread detached.
fn join_drain_within(handle: Option<Drain>, grace: Duration) -> Option<Vec<u8>> {
    let handle = handle?;
    let deadline = Instant::now() + grace;
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            return None;
        }
        std::thread::sleep(POLL_INTERVAL);
    }
    handle.join().ok()?.ok()
}

/// Put the child in a fresh process group so a timeout can take down its descendants.
fn isolate_process_group(cmd: &mut Command) {
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt as _;
        cmd.process_group(0);
    }
    #[cfg(not(unix))]
    let _ = cmd;
}

#[cfg(unix)]
#[allow(unsafe_code)]
fn kill_tree(child: &mut Child) {
    // With `process_group(0)` the group id equals the child's pid.
    let Ok(pgid) = libc::pid_t::try_from(child.id()) else {
        let _ = child.kill();
        return;
    };
    // SAFETY: killpg only sends a signal; it touches no memory owned by this process.
    let rc = unsafe { libc::killpg(pgid, libc::SIGKILL) };
    if rc != 0 {
        let _ = child.kill();
    }
}

#[cfg(not(unix))]
fn kill_tree(child: &mut Child) {
    let _ = child.kill();
}

fn join_drain(handle: Option<Drain>, name: &str) -> ComposeResult<Vec<u8>> {
    let Some(handle) = handle else {
        return Ok(Vec::new());
    };
    let bytes = handle
        .join()
        .map_err(|_| anyhow::anyhow!("{name} drain thread panicked"))?
        .with_context(|| format!("failed to read child {name}"))?;
    Ok(bytes)
}

/// Run `invocation` to completion and capture both output streams.
///
/// With `timeout == None` this blocks until the child exits. Otherwise the child is
/// killed once the deadline passes and [`ComposeError::Timeout`] is returned.
pub fn run(
    invocation: &ExternalToolInvocation,
    timeout: Option<Duration>,
) -> ComposeResult<InvocationResult> {
    run_command(invocation.to_command(), timeout)
}

/// Like [`run`] for an arbitrary command; stdout and stderr must already be piped.
pub fn run_command(mut cmd: Command, timeout: Option<Duration>) -> ComposeResult<InvocationResult> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    isolate_process_group(&mut cmd);
    let mut child = cmd.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ComposeError::tool_unavailable(format!(
                "'{program}' was not found (is it installed and on PATH?)"
            ))
        } else {
            ComposeError::Other(
                anyhow::Error::new(e).context(format!("failed to spawn '{program}'")),
            )
        }
    })?;

    // Drain both pipes concurrently so a chatty child never stalls on a full buffer.
    let stdout_drain = child.stdout.take().map(spawn_drain);
    let stderr_drain = child.stderr.take().map(spawn_drain);

    let status = match timeout {
        None => child
            .wait()
            .with_context(|| format!("failed to wait for '{program}'"))?,
        Some(limit) => match wait_with_deadline(&mut child, limit)? {
            Some(status) => status,
            None => {
                tracing::warn!(
                    program = %program,
                    timeout_ms = limit.as_millis() as u64,
                    "killing external tool after timeout"
                );
                // The child may have exited between the last poll and now.
                kill_tree(&mut child);
                child
                    .wait()
                    .with_context(|| format!("failed to reap '{program}' after kill"))?;
                for (name, drain) in [("stdout", stdout_drain), ("stderr", stderr_drain)] {
                    if let Some(msg) =
                        partial_output_message(name, join_drain_within(drain, DRAIN_GRACE))
                    {
                        tracing::warn!("{msg}");
                    }
                }
                return Err(ComposeError::Timeout { after: limit });
            }
        },
    };

    Ok(InvocationResult {
        code: status.code(),
        stdout: join_drain(stdout_drain, "stdout")?,
        stderr: join_drain(stderr_drain, "stderr")?,
    })
}

/// What a timed-out child left on `name`, or `None` if it wrote nothing.
fn partial_output_message(name: &str, bytes: Option<Vec<u8>>) -> Option<String> {
    match bytes {
        Some(bytes) if bytes.is_empty() => None,
        Some(bytes) => Some(format!(
            "{name} before timeout:\n{}",
            String::from_utf8_lossy(&bytes).trim_end()
        )),
        None => Some(format!("{name} still held open after kill; reader detached")),
    }
}

fn wait_with_deadline(child: &mut Child, limit: Duration) -> ComposeResult<Option<ExitStatus>> {
    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child
            .try_wait()
            .context("failed to poll external tool status")?
        {
            return Ok(Some(status));
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        std::thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}
