//! Running a single command with a hard timeout and bounded output capture.
//!
//! [`run`] spawns the command in its own process group, feeds it stdin, drains stdout and stderr
//! into capped buffers and waits for it with an explicit timer. When the timer fires the whole
//! process group is killed with `SIGKILL` and the child is reaped, so both the awaiting call and
//! the OS processes are guaranteed to finish. A non-zero exit or a timeout is an ordinary
//! [`ExecutionResult`]; only a failure to spawn the program is an error.

use std::{
    io,
    path::PathBuf,
    process::Stdio,
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

use codebox_utils::{DEFAULT_KILL_GRACE_MS, DEFAULT_MAX_OUTPUT_BYTES};
use nix::{
    errno::Errno,
    sys::signal::{killpg, Signal},
    unistd::Pid,
};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWriteExt},
    process::Command,
    task::JoinHandle,
    time,
};
use typed_builder::TypedBuilder;

use crate::{CodeboxError, CodeboxResult, ExecutionResult};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

const READ_CHUNK_SIZE: usize = 8 * 1024;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// How a command is run.
#[derive(Debug, Clone, TypedBuilder)]
pub struct RunOptions {
    /// Working directory of the child.
    #[builder(setter(into))]
    pub cwd: PathBuf,

    /// Text written to the child's stdin before it is closed.
    #[builder(default, setter(into))]
    pub stdin: String,

    /// Wall-clock limit after which the process group is killed.
    pub timeout: Duration,

    /// Bytes kept from each of stdout and stderr.
    #[builder(default = DEFAULT_MAX_OUTPUT_BYTES)]
    pub max_output_bytes: usize,

    /// How long output readers may drain once the process is gone.
    #[builder(default = Duration::from_millis(DEFAULT_KILL_GRACE_MS))]
    pub kill_grace: Duration,
}

/// Keeps the first `cap` bytes of a stream and counts the rest as dropped.
#[derive(Debug)]
struct CappedBuffer {
    bytes: Vec<u8>,
    cap: usize,
    truncated: bool,
}

type SharedBuffer = Arc<Mutex<CappedBuffer>>;

/// Kills the child's process group when dropped while still armed.
///
/// The group id equals the child's pid because the child is spawned with `process_group(0)`.
struct ProcessGroupGuard {
    pgid: Option<Pid>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl CappedBuffer {
    fn shared(cap: usize) -> SharedBuffer {
        Arc::new(Mutex::new(Self {
            bytes: Vec::new(),
            cap,
            truncated: false,
        }))
    }

    fn push(&mut self, chunk: &[u8]) {
        let room = self.cap.saturating_sub(self.bytes.len());
        if chunk.len() > room {
            self.truncated = true;
        }
        self.bytes.extend_from_slice(&chunk[..chunk.len().min(room)]);
    }

    /// Decodes the kept bytes as lossy UTF-8 without exceeding the cap.
    ///
    /// A character split by the cap is dropped rather than replaced, and replacement characters
    /// substituted for invalid bytes never push the text past `cap` bytes.
    fn take(shared: &SharedBuffer) -> (String, bool) {
        let mut buffer = shared.lock().unwrap_or_else(PoisonError::into_inner);
        let mut bytes = std::mem::take(&mut buffer.bytes);
        let mut truncated = buffer.truncated;

        if truncated {
            trim_partial_char(&mut bytes);
        }

        let mut text = String::from_utf8_lossy(&bytes).into_owned();
        if text.len() > buffer.cap {
            let mut end = buffer.cap;
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            text.truncate(end);
            truncated = true;
        }

        (text, truncated)
    }
}

impl ProcessGroupGuard {
    fn new(pid: Option<u32>) -> Self {
        Self {
            pgid: pid
                .and_then(|pid| i32::try_from(pid).ok())
                .map(Pid::from_raw),
        }
    }

    fn kill(&self) {
        let Some(pgid) = self.pgid else {
            return;
        };

        match killpg(pgid, Signal::SIGKILL) {
            Ok(()) | Err(Errno::ESRCH) => {}
            Err(e) => tracing::warn!("failed to kill process group {}: {}", pgid, e),
        }
    }

    /// Kills whatever is left of the group and stops tracking it.
    fn kill_and_disarm(&mut self) {
        self.kill();
        self.pgid = None;
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Drop for ProcessGroupGuard {
    fn drop(&mut self) {
        if self.pgid.is_some() {
            tracing::debug!("execution abandoned, killing process group");
            self.kill();
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Runs `argv` to completion or until `options.timeout` elapses.
///
/// Returns a result with `timed_out = true` and no exit code when the timer fired first. Fails
/// only when the program cannot be started at all.
pub async fn run(argv: &[String], options: &RunOptions) -> CodeboxResult<ExecutionResult> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| CodeboxError::Config("cannot run an empty command".to_string()))?;

    let mut command = Command::new(program);
    command
        .args(args)
        .current_dir(&options.cwd)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .process_group(0)
        .kill_on_drop(true);

    let start = Instant::now();
    let mut child = command.spawn().map_err(|source| {
        tracing::error!("failed to spawn {}: {}", program, source);
        CodeboxError::SpawnFailure {
            program: program.clone(),
            source,
        }
    })?;

    let mut group = ProcessGroupGuard::new(child.id());
    tracing::debug!("spawned {} (pid {:?})", program, child.id());

    let stdout = CappedBuffer::shared(options.max_output_bytes);
    let stderr = CappedBuffer::shared(options.max_output_bytes);

    let mut tasks: Vec<JoinHandle<()>> = Vec::with_capacity(3);

    if let Some(mut pipe) = child.stdin.take() {
        let input = options.stdin.clone().into_bytes();
        tasks.push(tokio::spawn(async move {
            // The child may exit without reading its input.
            if let Err(e) = pipe.write_all(&input).await {
                if e.kind() != io::ErrorKind::BrokenPipe {
                    tracing::debug!("failed to write stdin: {}", e);
                }
            }
        }));
    }

    if let Some(pipe) = child.stdout.take() {
        tasks.push(tokio::spawn(drain(pipe, Arc::clone(&stdout))));
    }

    if let Some(pipe) = child.stderr.take() {
        tasks.push(tokio::spawn(drain(pipe, Arc::clone(&stderr))));
    }

    let (status, timed_out) = match time::timeout(options.timeout, child.wait()).await {
        Ok(status) => (Some(status.map_err(CodeboxError::Process)?), false),
        Err(_) => {
            tracing::debug!("{} timed out after {:?}", program, options.timeout);
            group.kill();
            if let Err(e) = child.kill().await {
                tracing::warn!("failed to reap timed out child: {}", e);
            }
            (None, true)
        }
    };

    let duration = start.elapsed();

    // Background descendants would otherwise keep the pipes open.
    group.kill_and_disarm();

    let drained = time::timeout(options.kill_grace, async {
        for task in tasks.iter_mut() {
            let _ = task.await;
        }
    })
    .await;

    if drained.is_err() {
        tracing::warn!("output of {} still open after grace period", program);
        for task in &tasks {
            task.abort();
        }
    }

    let (stdout, stdout_truncated) = CappedBuffer::take(&stdout);
    let (stderr, stderr_truncated) = CappedBuffer::take(&stderr);

    Ok(ExecutionResult {
        stdout,
        stderr,
        exit_code: status.and_then(|status| status.code()),
        timed_out,
        duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        phase: None,
        signal: status.and_then(|status| {
            use std::os::unix::process::ExitStatusExt;
            status.signal()
        }),
        truncated: stdout_truncated || stderr_truncated,
    })
}

/// Drops an incomplete multi-byte sequence left at the end of `bytes` by a cut.
fn trim_partial_char(bytes: &mut Vec<u8>) {
    let tail = bytes.len().saturating_sub(3);
    let Some(offset) = bytes[tail..].iter().rposition(|byte| byte & 0xC0 != 0x80) else {
        return;
    };

    let start = tail + offset;
    if let Err(e) = std::str::from_utf8(&bytes[start..]) {
        if e.error_len().is_none() {
            bytes.truncate(start);
        }
    }
}

/// Reads `reader` to EOF, keeping what fits in `sink` and discarding the rest.
async fn drain<R>(mut reader: R, sink: SharedBuffer)
where
    R: AsyncRead + Unpin,
{
    let mut chunk = [0u8; READ_CHUNK_SIZE];

    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => sink
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(&chunk[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::debug!("stopped reading child output: {}", e);
                break;
            }
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
