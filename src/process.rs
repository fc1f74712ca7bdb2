//! External process capability.
//!
//! Everything that runs another program goes through [`ProcessLauncher`], so
//! the fan-out and fan-in logic can be driven by a fake in tests.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io;
use std::path::Path;
use std::process::{Child, Command, ExitStatus};

/// How a process ended. `code` is `None` when it was killed by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitReport {
    code: Option<i32>,
}

impl ExitReport {
    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn code(&self) -> Option<i32> {
        self.code
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for ExitReport {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

impl fmt::Display for ExitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(0) => write!(f, "exited successfully"),
            Some(code) => write!(f, "exited with code {code}"),
            None => write!(f, "was terminated by a signal"),
        }
    }
}

/// Output of a process run to completion with its streams captured.
#[derive(Debug, Clone)]
pub struct Captured {
    pub status: ExitReport,
    pub stdout: String,
    pub stderr: String,
}

pub trait ProcessLauncher {
    type Handle;

    /// Start `program` without waiting for it.
    fn start(&self, program: &OsStr, args: &[OsString], cwd: Option<&Path>)
        -> io::Result<Self::Handle>;

    /// Block until the process behind `handle` exits.
    fn wait(&self, handle: Self::Handle) -> io::Result<ExitReport>;

    /// Run `program` to completion, capturing stdout and stderr.
    fn capture(&self, program: &OsStr, args: &[OsString]) -> io::Result<Captured>;
}

/// Launches real child processes. Children inherit stdout and stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl ProcessLauncher for SystemLauncher {
    type Handle = Child;

    fn start(
        &self,
        program: &OsStr,
        args: &[OsString],
        cwd: Option<&Path>,
    ) -> io::Result<Child> {
        let mut command = Command::new(program);
        command.args(args);
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }
        command.spawn()
    }

    fn wait(&self, mut handle: Child) -> io::Result<ExitReport> {
        handle.wait().map(ExitReport::from)
    }

    fn capture(&self, program: &OsStr, args: &[OsString]) -> io::Result<Captured> {
        let output = Command::new(program).args(args).output()?;
        Ok(Captured {
            status: output.status.into(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
