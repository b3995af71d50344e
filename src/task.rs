//! High-level rsync task with live progress
//!
//! A [`Task`] starts rsync, reads its stdout and stderr concurrently on two
//! tokio tasks, and keeps a [`State`] and a [`Log`] up to date while the
//! transfer runs. Callers poll [`Task::state`] and [`Task::log`] or subscribe
//! to state changes with [`Task::subscribe`].
//!
//! ## Ownership
//!
//! The stdout reader is the only writer of the state and of `Log::stdout`;
//! the stderr reader is the only writer of `Log::stderr`. Both are published
//! through `tokio::sync::watch`, so readers always get a consistent snapshot
//! and never hold up the readers of the pipes.

use crate::options::RsyncOptions;
use crate::parser::OutputParser;
use crate::rsync::Rsync;
use crate::types::{Log, State};
use crate::{Error, Result};
use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// How long output is still read after rsync exits
///
/// A process rsync left behind (an `--rsh` helper, for example) may inherit
/// the pipes and keep them open long after rsync itself is gone.
pub const READER_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// One rsync synchronization run
///
/// # Examples
///
/// ```no_run
/// use rsync_task::{RsyncOptions, Task};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let options = RsyncOptions { progress: true, ..Default::default() };
/// let task = Task::new("/data/photos/", "/mnt/backup/photos", options)?;
///
/// let handle = task.spawn()?;
/// let mut updates = task.subscribe();
/// tokio::spawn(async move {
///     while updates.changed().await.is_ok() {
///         let state = updates.borrow_and_update().clone();
///         println!("{:.1}% ({} left) at {}", state.progress, state.remain, state.speed);
///     }
/// });
///
/// handle.wait().await?;
/// println!("{}", task.log().stdout);
/// # Ok(())
/// # }
/// ```
pub struct Task {
    rsync: Rsync,
    parser: Arc<OutputParser>,
    state: Arc<watch::Sender<State>>,
    log: Arc<watch::Sender<Log>>,
}

impl Task {
    /// Create a task copying `source` to `destination`
    ///
    /// Archive mode is always enabled, whatever `options` says.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BinaryNotFound`] if rsync cannot be located.
    pub fn new(
        source: impl AsRef<Path>,
        destination: impl AsRef<Path>,
        mut options: RsyncOptions,
    ) -> Result<Self> {
        options.archive = true;
        Self::with_rsync(Rsync::new(source, destination, &options)?)
    }

    /// Create a task around a prepared invocation, used as-is
    pub fn with_rsync(rsync: Rsync) -> Result<Self> {
        let (state, _) = watch::channel(State::default());
        let (log, _) = watch::channel(Log::default());

        Ok(Self {
            rsync,
            parser: Arc::new(OutputParser::new()?),
            state: Arc::new(state),
            log: Arc::new(log),
        })
    }

    /// The invocation this task runs
    pub fn rsync(&self) -> &Rsync {
        &self.rsync
    }

    /// Snapshot of the current transfer progress
    pub fn state(&self) -> State {
        self.state.borrow().clone()
    }

    /// Snapshot of the output captured so far
    pub fn log(&self) -> Log {
        self.log.borrow().clone()
    }

    /// Receive a notification whenever a progress or speed line is parsed
    pub fn subscribe(&self) -> watch::Receiver<State> {
        self.state.subscribe()
    }

    /// Start rsync without waiting for it
    ///
    /// Returns once the process is running and both output readers are
    /// scheduled. The state and log keep changing until the process exits and
    /// its pipes are drained; use [`TaskHandle::wait`] to wait for that.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spawn`] if rsync could not be started, or
    /// [`Error::Pipe`] if one of its output streams was not available. In the
    /// latter case the process is killed and any acquired stream is closed.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn spawn(&self) -> Result<TaskHandle> {
        let mut child = self.rsync.spawn()?;

        let pipes = child
            .stderr
            .take()
            .ok_or(Error::Pipe { stream: "stderr" })
            .and_then(|stderr| {
                let stdout = child.stdout.take().ok_or(Error::Pipe { stream: "stdout" })?;
                Ok((stdout, stderr))
            });
        let (stdout, stderr) = match pipes {
            Ok(pipes) => pipes,
            Err(e) => {
                if let Err(kill_err) = child.start_kill() {
                    tracing::warn!(error = %kill_err, "failed to kill rsync after pipe setup failure");
                }
                return Err(e);
            }
        };

        let stdout_worker = {
            let parser = Arc::clone(&self.parser);
            let state = Arc::clone(&self.state);
            let log = Arc::clone(&self.log);
            tokio::spawn(async move { process_stdout(stdout, &parser, &state, &log).await })
        };
        let stderr_worker = {
            let log = Arc::clone(&self.log);
            tokio::spawn(async move { process_stderr(stderr, &log).await })
        };

        tracing::debug!(pid = ?child.id(), "rsync started");

        Ok(TaskHandle {
            child,
            workers: [stdout_worker, stderr_worker],
            log: Arc::clone(&self.log),
        })
    }

    /// Run rsync to completion
    ///
    /// Equivalent to [`Task::spawn`] followed by [`TaskHandle::wait`], so it
    /// returns at most [`READER_DRAIN_TIMEOUT`] after rsync exits.
    ///
    /// # Errors
    ///
    /// Returns the start errors of [`Task::spawn`], or
    /// [`Error::ExitStatus`] if rsync exited unsuccessfully.
    pub async fn run(&self) -> Result<()> {
        self.spawn()?.wait().await
    }
}

/// A running rsync process started by [`Task::spawn`]
///
/// Dropping the handle does not stop rsync; the readers keep updating the
/// task until the process closes its output.
pub struct TaskHandle {
    child: Child,
    workers: [JoinHandle<()>; 2],
    log: Arc<watch::Sender<Log>>,
}

impl TaskHandle {
    /// OS process id, if the process has not been reaped yet
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Wait for rsync to exit and for its output to be fully read
    ///
    /// Once rsync has exited, each reader gets [`READER_DRAIN_TIMEOUT`] to
    /// reach end of stream. A reader still blocked after that, because another
    /// process holds the pipe open, is stopped. After this returns, the task's
    /// state and log no longer change.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExitStatus`] with the captured stderr if rsync exited
    /// unsuccessfully, or [`Error::Io`] if waiting on the process failed.
    pub async fn wait(mut self) -> Result<()> {
        let status = self.child.wait().await?;

        let deadline = tokio::time::Instant::now() + READER_DRAIN_TIMEOUT;
        for (stream, mut worker) in ["stdout", "stderr"].into_iter().zip(self.workers) {
            match tokio::time::timeout_at(deadline, &mut worker).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!(stream, error = %e, "rsync output reader terminated abnormally");
                }
                Err(_) => {
                    tracing::debug!(stream, "output still open after rsync exited; stopped reading");
                    worker.abort();
                    // the reader is gone once the cancelled join resolves
                    let _ = worker.await;
                }
            }
        }

        if status.success() {
            tracing::info!("rsync finished");
            Ok(())
        } else {
            tracing::warn!(code = ?status.code(), "rsync exited unsuccessfully");
            Err(Error::ExitStatus {
                code: status.code(),
                stderr: self.log.borrow().stderr.clone(),
            })
        }
    }
}

/// Feed every stdout line through the progress parser and into the log
pub(crate) async fn process_stdout<R>(
    stream: R,
    parser: &OutputParser,
    state: &watch::Sender<State>,
    log: &watch::Sender<Log>,
) where
    R: AsyncRead + Unpin,
{
    for_each_line(stream, "stdout", |line| {
        if state.send_if_modified(|current| parser.apply(line, current)) {
            tracing::trace!(line, "progress line");
        }
        log.send_modify(|log| append_line(&mut log.stdout, line));
    })
    .await;
}

/// Append every stderr line to the log
pub(crate) async fn process_stderr<R>(stream: R, log: &watch::Sender<Log>)
where
    R: AsyncRead + Unpin,
{
    for_each_line(stream, "stderr", |line| {
        log.send_modify(|log| append_line(&mut log.stderr, line));
    })
    .await;
}

fn append_line(buffer: &mut String, line: &str) {
    buffer.push_str(line);
    buffer.push('\n');
}

/// Call `f` for each `\n`-terminated line until end of stream
///
/// Carriage returns inside a line are kept; rsync uses them to redraw its
/// progress display. A read error ends the scan.
async fn for_each_line<R, F>(stream: R, stream_name: &'static str, mut f: F)
where
    R: AsyncRead + Unpin,
    F: FnMut(&str),
{
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => f(&decode_line(&buf)[..]),
            Err(e) => {
                tracing::debug!(stream = stream_name, error = %e, "stopped reading rsync output");
                break;
            }
        }
    }
}

fn decode_line(buf: &[u8]) -> Cow<'_, str> {
    let line = buf.strip_suffix(b"\n").unwrap_or(buf);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line)
}
