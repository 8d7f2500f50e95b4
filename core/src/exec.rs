#[cfg(unix)]
use std::os::unix::process::ExitStatusExt;

use std::io;
use std::path::Path;
use std::process::ExitStatus;
use std::time::Duration;
use std::time::Instant;

use async_channel::Receiver;
use async_channel::Sender;
use tokio::io::AsyncRead;
use tokio::io::AsyncReadExt;
use tokio::io::BufReader;
use tokio::process::Child;
use tokio::task::JoinHandle;
use webterm_protocol::ExecuteCommandResponse;
use webterm_protocol::TIMEOUT_EXIT_CODE;

use crate::project::ProjectsRoot;
use crate::spawn::spawn_shell_child;

pub const DEFAULT_EXEC_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Appended to stderr when the deadline kills a command.
pub const TIMEOUT_MARKER: &str = "Command timed out";

const EXIT_CODE_SIGNAL_BASE: i32 = 128; // conventional shell: 128 + signal
const SPAWN_NOT_FOUND_EXIT_CODE: i32 = 127;
const SPAWN_FAILED_EXIT_CODE: i32 = 126;
const WAIT_FAILED_EXIT_CODE: i32 = 1;

// I/O buffer sizing
const READ_CHUNK_SIZE: usize = 8192; // bytes per read
const OUTPUT_BUFFER_INITIAL_CAPACITY: usize = 8 * 1024; // 8 KiB

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub command: String,
    pub project_id: String,
}

impl ExecutionRequest {
    pub fn new(command: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            project_id: project_id.into(),
        }
    }
}

/// How a command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// The shell exited on its own. Signal deaths are folded into
    /// `128 + signal`.
    Exited(i32),
    /// The deadline elapsed and the shell was killed.
    TimedOut,
}

impl ExitOutcome {
    /// Wire representation: the exit code, or [`TIMEOUT_EXIT_CODE`].
    pub fn code(self) -> i32 {
        match self {
            ExitOutcome::Exited(code) => code,
            ExitOutcome::TimedOut => TIMEOUT_EXIT_CODE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub exit: ExitOutcome,
    pub duration: Duration,
}

impl ExecutionResult {
    pub fn timed_out(&self) -> bool {
        self.exit == ExitOutcome::TimedOut
    }
}

impl From<ExecutionResult> for ExecuteCommandResponse {
    fn from(result: ExecutionResult) -> Self {
        Self {
            output: result.stdout,
            error: result.stderr,
            exit_code: result.exit.code(),
        }
    }
}

/// Runs one command line per call. Holds no per-request state, so a single
/// executor can serve concurrent requests.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    projects_root: ProjectsRoot,
    timeout: Duration,
}

impl CommandExecutor {
    pub fn new(projects_root: ProjectsRoot) -> Self {
        Self {
            projects_root,
            timeout: DEFAULT_EXEC_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs `request` to completion or until the deadline.
    ///
    /// Every failure (missing directory, missing shell, wait errors) is
    /// reported inside the result's stderr; this never returns an error.
    pub async fn execute(&self, request: &ExecutionRequest) -> ExecutionResult {
        let start = Instant::now();
        let cwd = self.projects_root.resolve(&request.project_id);

        let child = match spawn_shell_child(&request.command, &cwd) {
            Ok(child) => child,
            Err(err) => {
                tracing::warn!(
                    project_id = %request.project_id,
                    cwd = %cwd.display(),
                    error = %err,
                    "failed to spawn command"
                );
                return ExecutionResult {
                    stdout: String::new(),
                    stderr: spawn_failure_message(&err, &cwd),
                    exit: ExitOutcome::Exited(spawn_failure_exit_code(&err)),
                    duration: start.elapsed(),
                };
            }
        };

        let raw = consume_output(child, self.timeout).await;
        let duration = start.elapsed();

        let stdout = String::from_utf8_lossy(&raw.stdout).into_owned();
        let mut stderr = String::from_utf8_lossy(&raw.stderr).into_owned();

        let exit = match raw.completion {
            Completion::Exited(code) => ExitOutcome::Exited(code),
            Completion::WaitFailed(err) => {
                tracing::error!(error = %err, "failed to wait for command");
                append_line(&mut stderr, &format!("Failed to wait for command: {err}"));
                ExitOutcome::Exited(WAIT_FAILED_EXIT_CODE)
            }
            Completion::TimedOut => {
                tracing::warn!(
                    project_id = %request.project_id,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "command timed out"
                );
                append_line(&mut stderr, TIMEOUT_MARKER);
                ExitOutcome::TimedOut
            }
        };

        tracing::info!(
            project_id = %request.project_id,
            exit_code = exit.code(),
            duration_ms = duration.as_millis() as u64,
            stdout_bytes = stdout.len(),
            stderr_bytes = stderr.len(),
            "command finished"
        );

        ExecutionResult {
            stdout,
            stderr,
            exit,
            duration,
        }
    }
}

#[derive(Debug)]
enum Completion {
    Exited(i32),
    WaitFailed(io::Error),
    TimedOut,
}

#[derive(Debug)]
struct RawExecOutput {
    completion: Completion,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExecOutputStream {
    Stdout,
    Stderr,
}

#[derive(Debug)]
struct OutputChunk {
    stream: ExecOutputStream,
    bytes: Vec<u8>,
}

/// Drains both pipes while racing completion against `timeout`.
///
/// Completion means the shell exited and both pipes reached EOF, so a
/// background job that keeps a pipe open holds the request until the
/// deadline. On timeout only the shell is killed; whatever the readers
/// forwarded before that point is kept.
async fn consume_output(mut child: Child, timeout: Duration) -> RawExecOutput {
    let (chunk_tx, chunk_rx) = async_channel::unbounded::<OutputChunk>();

    // Slots are emptied once a reader has been awaited: a finished
    // JoinHandle must not be polled again.
    let mut readers: Vec<Option<JoinHandle<io::Result<()>>>> = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        readers.push(Some(tokio::spawn(read_stream(
            BufReader::new(stdout),
            ExecOutputStream::Stdout,
            chunk_tx.clone(),
        ))));
    }
    if let Some(stderr) = child.stderr.take() {
        readers.push(Some(tokio::spawn(read_stream(
            BufReader::new(stderr),
            ExecOutputStream::Stderr,
            chunk_tx.clone(),
        ))));
    }
    drop(chunk_tx);

    let completion = async {
        let status = child.wait().await;
        for slot in readers.iter_mut() {
            let Some(reader) = slot.as_mut() else {
                continue;
            };
            let joined = reader.await;
            *slot = None;
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(err)) => tracing::warn!(error = %err, "failed to read command output"),
                Err(err) => tracing::warn!(error = %err, "output reader task failed"),
            }
        }
        status
    };
    let waited = tokio::time::timeout(timeout, completion).await;

    let completion = match waited {
        Ok(Ok(status)) => Completion::Exited(exit_code_from_status(status)),
        Ok(Err(err)) => Completion::WaitFailed(err),
        Err(_) => {
            // Best effort: the shell may already be gone, and descendants
            // are not signalled.
            if let Err(err) = child.start_kill() {
                tracing::warn!(error = %err, "failed to kill timed out command");
            }
            for reader in readers.into_iter().flatten() {
                reader.abort();
                let _ = reader.await;
            }
            Completion::TimedOut
        }
    };

    let (stdout, stderr) = collect_chunks(&chunk_rx);
    RawExecOutput {
        completion,
        stdout,
        stderr,
    }
}

async fn read_stream<R: AsyncRead + Unpin + Send + 'static>(
    mut reader: R,
    stream: ExecOutputStream,
    chunk_tx: Sender<OutputChunk>,
) -> io::Result<()> {
    let mut tmp = [0u8; READ_CHUNK_SIZE];
    loop {
        let n = reader.read(&mut tmp).await?;
        if n == 0 {
            break;
        }
        let chunk = OutputChunk {
            stream,
            bytes: tmp[..n].to_vec(),
        };
        if chunk_tx.send(chunk).await.is_err() {
            break;
        }
        // Continue reading to EOF to avoid back-pressure
    }
    Ok(())
}

fn collect_chunks(chunk_rx: &Receiver<OutputChunk>) -> (Vec<u8>, Vec<u8>) {
    let mut stdout = Vec::with_capacity(OUTPUT_BUFFER_INITIAL_CAPACITY);
    let mut stderr = Vec::with_capacity(OUTPUT_BUFFER_INITIAL_CAPACITY);
    while let Ok(chunk) = chunk_rx.try_recv() {
        match chunk.stream {
            ExecOutputStream::Stdout => stdout.extend_from_slice(&chunk.bytes),
            ExecOutputStream::Stderr => stderr.extend_from_slice(&chunk.bytes),
        }
    }
    (stdout, stderr)
}

fn exit_code_from_status(status: ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        if let Some(signal) = status.signal() {
            return EXIT_CODE_SIGNAL_BASE + signal;
        }
    }
    status.code().unwrap_or(WAIT_FAILED_EXIT_CODE)
}

fn spawn_failure_exit_code(err: &io::Error) -> i32 {
    if err.kind() == io::ErrorKind::NotFound {
        SPAWN_NOT_FOUND_EXIT_CODE
    } else {
        SPAWN_FAILED_EXIT_CODE
    }
}

fn spawn_failure_message(err: &io::Error, cwd: &Path) -> String {
    format!("Failed to start command in {}: {err}\n", cwd.display())
}

/// Appends `line` to `buf`, starting a new line first if `buf` has a
/// partial last line.
fn append_line(buf: &mut String, line: &str) {
    if !buf.is_empty() && !buf.ends_with('\n') {
        buf.push('\n');
    }
    buf.push_str(line);
}
