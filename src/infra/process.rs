//! Child process execution
//!
//! Runs command lines through the platform shell with both output pipes
//! captured. The pipes are drained concurrently on one task; every chunk is
//! appended to a single combined buffer in arrival order and forwarded to a
//! [`ConsoleSink`], which decides whether and where to echo it.
//!
//! # Prompt heuristic
//!
//! When [`ProcessRunner::stop_on_prompt`] is enabled (the default), reading
//! stops once the combined output ends with the shell prompt byte
//! ([`SHELL_PROMPT`]) and the child then stays silent for the idle window
//! ([`ProcessRunner::prompt_idle`]). This treats a child that dropped into an
//! interactive shell as finished instead of hanging forever. A child that
//! keeps writing or exits within the window is never interrupted. The
//! heuristic can still misfire on a long pause after output ending in that
//! byte, so it can be switched off.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::Command;

use crate::config::defaults::{PROMPT_IDLE_MS, SHELL_PROMPT};
use crate::core::command::CommandLine;
use crate::error::ProcessError;

/// Separator that chains commands in one shell session
const CHAIN_SEPARATOR: &str = " && ";

/// Read buffer size per pipe
const READ_CHUNK: usize = 4096;

/// One shell invocation made of one or more command lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellScript(String);

impl ShellScript {
    /// Script running a single command
    pub fn single(command: &CommandLine) -> Self {
        Self(command.to_string())
    }

    /// Script running commands back to back, stopping at the first failure
    pub fn chain(commands: &[CommandLine]) -> Self {
        Self(
            commands
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(CHAIN_SEPARATOR),
        )
    }

    /// Script text as passed to the shell
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&CommandLine> for ShellScript {
    fn from(command: &CommandLine) -> Self {
        Self::single(command)
    }
}

/// Which pipe a chunk came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    /// Standard output
    Stdout,
    /// Standard error
    Stderr,
}

/// Destination for child output as it arrives
pub trait ConsoleSink: Send {
    /// Handle a chunk read from the child's stdout
    fn stdout(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Handle a chunk read from the child's stderr
    fn stderr(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Called once after the last chunk
    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Discards all output
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl ConsoleSink for SilentSink {
    fn stdout(&mut self, _bytes: &[u8]) -> io::Result<()> {
        Ok(())
    }

    fn stderr(&mut self, _bytes: &[u8]) -> io::Result<()> {
        Ok(())
    }
}

/// Records every chunk with its stream
#[derive(Debug, Default, Clone)]
pub struct CaptureSink {
    /// Chunks in arrival order
    pub chunks: Vec<(Stream, Vec<u8>)>,
}

impl CaptureSink {
    /// All bytes received from one stream
    pub fn bytes(&self, stream: Stream) -> Vec<u8> {
        self.chunks
            .iter()
            .filter(|(s, _)| *s == stream)
            .flat_map(|(_, b)| b.iter().copied())
            .collect()
    }
}

impl ConsoleSink for CaptureSink {
    fn stdout(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.chunks.push((Stream::Stdout, bytes.to_vec()));
        Ok(())
    }

    fn stderr(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.chunks.push((Stream::Stderr, bytes.to_vec()));
        Ok(())
    }
}

/// Echoes child output to a pair of writers
///
/// Stdout bytes are passed through untouched. Stderr is decoded as UTF-8;
/// bytes that do not decode are written as `\xNN` escapes instead of
/// aborting, and a sequence split across two reads is held back until the
/// rest arrives.
#[derive(Debug)]
pub struct TerminalSink<O: Write, E: Write> {
    out: O,
    err: E,
    pending: Vec<u8>,
}

impl TerminalSink<io::Stdout, io::Stderr> {
    /// Sink writing to the process's own stdout and stderr
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> TerminalSink<O, E> {
    /// Sink writing to arbitrary writers
    pub fn new(out: O, err: E) -> Self {
        Self {
            out,
            err,
            pending: Vec::new(),
        }
    }

    /// Consume the sink, returning the writers
    pub fn into_inner(mut self) -> (O, E) {
        let _ = self.flush_pending();
        (self.out, self.err)
    }

    fn write_decoded(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut pending = std::mem::take(&mut self.pending);
        pending.extend_from_slice(bytes);
        let mut rest: &[u8] = &pending;
        let mut text = String::new();

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    text.push_str(valid);
                    rest = &[];
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    text.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        Some(len) => {
                            for byte in &after[..len] {
                                text.push_str(&format!("\\x{byte:02x}"));
                            }
                            rest = &after[len..];
                        }
                        // Incomplete sequence at the end, wait for more bytes
                        None => {
                            rest = after;
                            break;
                        }
                    }
                }
            }
        }

        self.pending = rest.to_vec();
        self.err.write_all(text.as_bytes())?;
        self.err.flush()
    }

    fn flush_pending(&mut self) -> io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let text: String = self
            .pending
            .drain(..)
            .map(|byte| format!("\\x{byte:02x}"))
            .collect();
        self.err.write_all(text.as_bytes())?;
        self.err.flush()
    }
}

impl<O: Write + Send, E: Write + Send> ConsoleSink for TerminalSink<O, E> {
    fn stdout(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.out.write_all(bytes)?;
        self.out.flush()
    }

    fn stderr(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.write_decoded(bytes)
    }

    fn finish(&mut self) -> io::Result<()> {
        self.flush_pending()
    }
}

/// Result of running a shell script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnOutput {
    /// Exit code, `None` if the child was killed or stopped at a prompt
    pub code: Option<i32>,
    /// Combined stdout and stderr, decoded lossily
    pub output: String,
    /// Reading stopped because the output ended at a shell prompt
    pub prompt_detected: bool,
}

impl SpawnOutput {
    /// Whether the child exited with code 0
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Turn an unsuccessful run into [`ProcessError::Failed`] for `step`
    ///
    /// The buffered output travels with the error.
    pub fn into_result(self, step: &str) -> Result<Self, ProcessError> {
        if self.success() {
            Ok(self)
        } else {
            Err(ProcessError::Failed {
                step: step.to_string(),
                code: self.code,
                output: self.output,
            })
        }
    }
}

/// Runs shell scripts as child processes
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    /// Working directory for children
    work_dir: PathBuf,
    /// Stop reading when output ends at a shell prompt
    stop_on_prompt: bool,
    /// Silence required after a trailing prompt byte before giving up
    prompt_idle: Duration,
    /// Variables set on top of the inherited environment
    envs: Vec<(String, String)>,
}

impl ProcessRunner {
    /// Create a runner executing in `work_dir`
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            stop_on_prompt: true,
            prompt_idle: Duration::from_millis(PROMPT_IDLE_MS),
            envs: Vec::new(),
        }
    }

    /// Enable or disable the prompt heuristic
    #[must_use]
    pub fn stop_on_prompt(mut self, enabled: bool) -> Self {
        self.stop_on_prompt = enabled;
        self
    }

    /// How long output ending at a prompt must stay idle before reading stops
    #[must_use]
    pub fn prompt_idle(mut self, idle: Duration) -> Self {
        self.prompt_idle = idle;
        self
    }

    /// Set an environment variable for every child
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Working directory for children
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    fn shell_command(script: &ShellScript) -> Command {
        let mut cmd = if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C");
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.arg("-c");
            cmd
        };
        cmd.arg(script.as_str());
        cmd
    }

    /// Run a script, streaming its output to `sink`
    ///
    /// Returns once both pipes reach end of file and the child has exited,
    /// or when the prompt heuristic fires.
    pub async fn run(
        &self,
        script: &ShellScript,
        sink: &mut dyn ConsoleSink,
    ) -> Result<SpawnOutput, ProcessError> {
        let io_err = |e: io::Error| ProcessError::Io {
            command: script.as_str().to_string(),
            error: e.to_string(),
        };

        tracing::debug!("Running: {}", script.as_str());
        let mut child = Self::shell_command(script)
            .current_dir(&self.work_dir)
            .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ProcessError::Spawn {
                command: script.as_str().to_string(),
                error: e.to_string(),
            })?;

        let (Some(mut stdout), Some(mut stderr)) = (child.stdout.take(), child.stderr.take())
        else {
            return Err(io_err(io::Error::other("child pipes were not captured")));
        };

        let mut combined = Vec::new();
        let mut out_buf = [0u8; READ_CHUNK];
        let mut err_buf = [0u8; READ_CHUNK];
        let mut out_open = true;
        let mut err_open = true;
        let mut prompt_detected = false;

        while out_open || err_open {
            let next = async {
                tokio::select! {
                    biased;
                    read = stdout.read(&mut out_buf), if out_open => (Stream::Stdout, read),
                    read = stderr.read(&mut err_buf), if err_open => (Stream::Stderr, read),
                }
            };

            let at_prompt = self.stop_on_prompt && combined.ends_with(SHELL_PROMPT);
            let (stream, read) = if at_prompt {
                match tokio::time::timeout(self.prompt_idle, next).await {
                    Ok(chunk) => chunk,
                    Err(_) => {
                        prompt_detected = true;
                        break;
                    }
                }
            } else {
                next.await
            };

            match (stream, read.map_err(io_err)?) {
                (Stream::Stdout, 0) => out_open = false,
                (Stream::Stderr, 0) => err_open = false,
                (Stream::Stdout, n) => {
                    combined.extend_from_slice(&out_buf[..n]);
                    sink.stdout(&out_buf[..n]).map_err(io_err)?;
                }
                (Stream::Stderr, n) => {
                    combined.extend_from_slice(&err_buf[..n]);
                    sink.stderr(&err_buf[..n]).map_err(io_err)?;
                }
            }
        }

        drop(stdout);
        drop(stderr);
        sink.finish().map_err(io_err)?;

        let code = if prompt_detected {
            tracing::warn!("Output ended at a shell prompt, stopped reading");
            match child.try_wait().map_err(io_err)? {
                Some(status) => status.code(),
                None => {
                    child.kill().await.map_err(io_err)?;
                    None
                }
            }
        } else {
            child.wait().await.map_err(io_err)?.code()
        };

        Ok(SpawnOutput {
            code,
            output: String::from_utf8_lossy(&combined).into_owned(),
            prompt_detected,
        })
    }
}
