//! Process execution utilities
//!
//! Provides safe process execution with proper error handling and logging.

use crate::error::{ParserError, Result};
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// How often a child is polled while a timeout is armed
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Utility for running external processes
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
}

/// Result of a process execution
#[derive(Debug)]
pub struct ProcessResult {
    /// Standard output
    pub stdout: String,
    /// Standard error, kept for diagnostics of successful runs
    pub stderr: String,
}

impl ProcessRunner {
    /// Create a new process runner; `None` waits for the child indefinitely
    #[must_use]
    pub const fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// Timeout applied to every command, if any
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Run a command and capture its output.
    ///
    /// A non-zero exit is reported as [`ParserError::Process`] carrying the
    /// captured streams; a child still running when the timeout expires is
    /// killed and reported as [`ParserError::Timeout`].
    #[instrument(skip(self))]
    pub fn run_command_with_output(&self, command: &str, args: &[String]) -> Result<ProcessResult> {
        let cmd_str = format_command(command, args);

        debug!("Running command with output capture: {}", cmd_str);

        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| process_failure(&cmd_str, "Failed to execute command", e))?;

        // Drain both pipes off-thread so a child filling one of them cannot
        // block while we wait on it.
        let stdout_reader = spawn_reader(child.stdout.take());
        let stderr_reader = spawn_reader(child.stderr.take());

        let status = match self.timeout {
            Some(limit) => wait_with_deadline(&mut child, &cmd_str, limit)?,
            None => child
                .wait()
                .map_err(|e| process_failure(&cmd_str, "Failed to wait for command", e))?,
        };

        let stdout = String::from_utf8_lossy(&collect(stdout_reader)).to_string();
        let stderr = String::from_utf8_lossy(&collect(stderr_reader)).to_string();
        let success = status.success();
        let exit_code = status.code();

        debug!(
            "Command finished: success={}, exit_code={:?}, stdout_len={}, stderr_len={}",
            success,
            exit_code,
            stdout.len(),
            stderr.len()
        );

        if !success {
            debug!("Command stderr: {}", stderr);
            return Err(ParserError::process(cmd_str, exit_code, stdout, stderr));
        }

        Ok(ProcessResult { stdout, stderr })
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Render a command line for logs and error messages
pub fn format_command(command: &str, args: &[String]) -> String {
    if args.is_empty() {
        command.to_string()
    } else {
        format!("{} {}", command, args.join(" "))
    }
}

fn process_failure(cmd_str: &str, context: &str, source: std::io::Error) -> ParserError {
    ParserError::Process {
        command: cmd_str.to_string(),
        exit_code: None,
        stdout: String::new(),
        stderr: format!("{context}: {source}"),
        source: Some(Box::new(source)),
    }
}

fn spawn_reader<R>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>>
where
    R: Read + Send + 'static,
{
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            if let Err(e) = pipe.read_to_end(&mut buf) {
                debug!("Failed to read child output: {}", e);
            }
            buf
        })
    })
}

fn collect(reader: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    reader
        .map(|handle| handle.join().unwrap_or_default())
        .unwrap_or_default()
}

fn wait_with_deadline(child: &mut Child, cmd_str: &str, limit: Duration) -> Result<ExitStatus> {
    let started = Instant::now();
    loop {
        if let Some(status) = child
            .try_wait()
            .map_err(|e| process_failure(cmd_str, "Failed to wait for command", e))?
        {
            return Ok(status);
        }

        if started.elapsed() >= limit {
            warn!("Command exceeded {:?}, killing it: {}", limit, cmd_str);
            if let Err(e) = child.kill() {
                debug!("Failed to kill child: {}", e);
            }
            let _ = child.wait();
            return Err(ParserError::timeout(cmd_str, limit.as_secs()));
        }

        thread::sleep(POLL_INTERVAL);
    }
}
