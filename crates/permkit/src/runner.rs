//! External command execution with bounded output capture.

use crate::error::{Error, Result};
use crate::ringbuf::RingBuffer;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};
use std::thread;

/// Maximum number of bytes kept from each output stream.
pub const MAX_CAPTURE_BYTES: usize = 16 * 1024;

/// A command described as program plus argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    /// Executable name or path
    pub program: String,
    /// Arguments, passed verbatim (no shell quoting)
    pub args: Vec<String>,
    /// Working directory for the child process
    pub current_dir: Option<PathBuf>,
}

impl ExternalCommand {
    /// Create a command with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    /// Run a command line through the platform shell.
    ///
    /// Only meant for user-supplied command lines; everything built
    /// internally uses [`ExternalCommand::new`] with explicit arguments.
    pub fn shell(line: &str) -> Self {
        if cfg!(windows) {
            Self::new("cmd").args(["/C", line])
        } else {
            Self::new("/bin/sh").args(["-c", line])
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

impl fmt::Display for ExternalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Output captured from a finished command.
#[derive(Debug)]
pub struct Captured {
    /// Exit status of the child
    pub status: ExitStatus,
    /// Tail of standard output (empty when redirected to a file)
    pub stdout: RingBuffer,
    /// Tail of standard error
    pub stderr: RingBuffer,
}

impl Captured {
    /// Standard output as text.
    pub fn stdout_text(&self) -> String {
        self.stdout.to_string_lossy()
    }

    /// Standard error as text.
    pub fn stderr_text(&self) -> String {
        self.stderr.to_string_lossy()
    }
}

/// Run a command and capture both output streams.
///
/// Fails if the command cannot be spawned or exits unsuccessfully.
pub fn run_capture(command: &ExternalCommand) -> Result<Captured> {
    let mut cmd = command.to_command();
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    log::debug!("Running: {command}");
    let child = spawn(command, &mut cmd)?;
    finish(command, child)
}

/// Run a command with standard output written to `stdout_path`.
///
/// The file is created (or truncated) before the command starts.
pub fn run_to_file(command: &ExternalCommand, stdout_path: &Path) -> Result<Captured> {
    let file = File::create(stdout_path)?;

    let mut cmd = command.to_command();
    cmd.stdin(Stdio::null())
        .stdout(Stdio::from(file))
        .stderr(Stdio::piped());

    log::debug!("Running: {command} > {}", stdout_path.display());
    let child = spawn(command, &mut cmd)?;
    finish(command, child)
}

fn spawn(command: &ExternalCommand, cmd: &mut Command) -> Result<Child> {
    cmd.spawn().map_err(|source| Error::Spawn {
        command: command.to_string(),
        source,
    })
}

fn finish(command: &ExternalCommand, child: Child) -> Result<Captured> {
    finish_with(command, child, drain)
}

fn finish_with<F>(command: &ExternalCommand, mut child: Child, read_stdout: F) -> Result<Captured>
where
    F: FnOnce(ChildStdout) -> std::io::Result<RingBuffer>,
{
    // stderr is drained on its own thread so a chatty child cannot
    // block on a full pipe while we read stdout
    let stderr_reader = child.stderr.take().map(|pipe| thread::spawn(move || drain(pipe)));

    let stdout = match child.stdout.take().map(read_stdout) {
        Some(Ok(ring)) => ring,
        Some(Err(e)) => {
            // reap the child before bailing out
            if let Err(kill_err) = child.kill() {
                log::debug!("Could not kill `{command}`: {kill_err}");
            }
            let _ = child.wait();
            if let Some(handle) = stderr_reader {
                let _ = handle.join();
            }
            return Err(Error::Io(e));
        }
        None => RingBuffer::new(MAX_CAPTURE_BYTES),
    };

    let stderr = match stderr_reader {
        Some(handle) => handle
            .join()
            .map_err(|_| Error::Io(std::io::Error::other("stderr reader panicked")))??,
        None => RingBuffer::new(MAX_CAPTURE_BYTES),
    };

    let status = child.wait()?;

    if let Some(notice) = truncation_notice(command, &stdout) {
        log::warn!("{notice}");
    }

    if !status.success() {
        return Err(Error::CommandFailed {
            command: command.to_string(),
            status,
            stderr: stderr.to_string_lossy().trim().to_string(),
        });
    }

    Ok(Captured {
        status,
        stdout,
        stderr,
    })
}

/// Message for output that lost its oldest bytes, if any were dropped.
fn truncation_notice(command: &ExternalCommand, ring: &RingBuffer) -> Option<String> {
    ring.is_truncated().then(|| {
        format!(
            "Output of `{command}` exceeded {} bytes; the first {} bytes were dropped",
            ring.capacity(),
            ring.total_written() - ring.len() as u64
        )
    })
}

fn drain(mut pipe: impl Read) -> std::io::Result<RingBuffer> {
    let mut ring = RingBuffer::new(MAX_CAPTURE_BYTES);
    let mut chunk = [0u8; 4096];
    loop {
        let n = pipe.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        ring.push(&chunk[..n]);
    }
    Ok(ring)
}
