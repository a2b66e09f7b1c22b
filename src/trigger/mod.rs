// src/trigger/mod.rs

//! Repository metadata regeneration
//!
//! After all artifacts are placed, an external tool (by default
//! `/usr/bin/createrepo`) is run once with the destination root as its only
//! argument. The tool is opaque: all we look at is its exit status.
//!
//! Process spawning sits behind the [`CommandRunner`] trait so the sync
//! engine can be exercised without launching real programs.

use crate::error::{Error, Result};
use std::ffi::OsString;
use std::fmt;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::{debug, info, warn};
use wait_timeout::ChildExt;

/// Default regeneration tool
pub const DEFAULT_REGENERATE_TOOL: &str = "/usr/bin/createrepo";

/// Where the child's standard output goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Send stdout to the null device
    Discard,
    /// Share our stdout
    Inherit,
}

/// A fully described external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<OsString>,
    pub stdout: OutputMode,
    /// Upper bound on the wait; `None` waits forever
    pub timeout: Option<Duration>,
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Exit status of a finished command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStatus {
    /// Exit code, `None` if the process was killed by a signal
    pub code: Option<i32>,
}

impl CommandStatus {
    /// True for a zero exit code
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit status {}", code),
            None => write!(f, "terminated by signal"),
        }
    }
}

/// Runs an external command to completion
pub trait CommandRunner {
    /// Run `invocation` and report how it exited
    ///
    /// Errors are reserved for failures to run the command at all (not
    /// found, spawn failure, timeout); a non-zero exit is a normal status.
    fn run(&self, invocation: &Invocation) -> Result<CommandStatus>;
}

/// [`CommandRunner`] backed by `std::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandStatus> {
        let program = which::which(&invocation.program)
            .map_err(|e| Error::ToolNotFound(format!("{}: {}", invocation.program, e)))?;

        debug!("Executing: {} {:?}", program.display(), invocation.args);

        let stdout = match invocation.stdout {
            OutputMode::Discard => Stdio::null(),
            OutputMode::Inherit => Stdio::inherit(),
        };

        let mut child = Command::new(&program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| {
                Error::RegenerationError(format!("Failed to spawn '{}': {}", program.display(), e))
            })?;

        let status = match invocation.timeout {
            Some(timeout) => match child
                .wait_timeout(timeout)
                .map_err(|e| wait_failed(invocation, e))?
            {
                Some(status) => status,
                None => {
                    warn!("{} timed out after {:?}, killing it", invocation, timeout);
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(Error::RegenerationError(format!(
                        "'{}' timed out after {} seconds",
                        invocation,
                        timeout.as_secs()
                    )));
                }
            },
            None => child.wait().map_err(|e| wait_failed(invocation, e))?,
        };

        Ok(CommandStatus {
            code: status.code(),
        })
    }
}

fn wait_failed(invocation: &Invocation, e: std::io::Error) -> Error {
    Error::RegenerationError(format!("Failed to wait for '{}': {}", invocation, e))
}

/// Runs the metadata regeneration tool against a destination root
#[derive(Debug, Clone)]
pub struct RegenerationTrigger {
    program: String,
    verbose: bool,
    timeout: Option<Duration>,
}

impl Default for RegenerationTrigger {
    fn default() -> Self {
        Self::new(DEFAULT_REGENERATE_TOOL)
    }
}

impl RegenerationTrigger {
    /// Create a trigger for `program`
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            verbose: false,
            timeout: None,
        }
    }

    /// Let the tool's stdout through instead of discarding it
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Bound how long to wait for the tool
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Program that will be run
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Describe the invocation for `destination`
    pub fn invocation(&self, destination: &Path) -> Invocation {
        Invocation {
            program: self.program.clone(),
            args: vec![destination.as_os_str().to_owned()],
            stdout: if self.verbose {
                OutputMode::Inherit
            } else {
                OutputMode::Discard
            },
            timeout: self.timeout,
        }
    }

    /// Run the tool once against `destination`
    pub fn run(&self, destination: &Path, runner: &dyn CommandRunner) -> Result<()> {
        let invocation = self.invocation(destination);
        info!("Running {}", invocation);

        let status = runner.run(&invocation)?;
        if !status.success() {
            return Err(Error::RegenerationError(format!(
                "'{}' failed with {}",
                invocation, status
            )));
        }

        info!("[OK] {} completed", self.program);
        Ok(())
    }
}
