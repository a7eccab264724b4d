use crate::steps::StepInvocation;
use std::io;
use std::process::{Command, ExitStatus};

/// Exit status of a finished installer process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildStatus {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl ChildStatus {
    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn signalled() -> Self {
        Self { code: None }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for ChildStatus {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

/// Boundary between the orchestrator and the external installers.
pub trait ProcessRunner {
    /// Run one invocation to completion. An `Err` means the process could
    /// not be started at all.
    fn run(&mut self, invocation: &StepInvocation) -> io::Result<ChildStatus>;
}

/// Runs installers as child processes with inherited stdio.
///
/// The child gets its own working directory; the orchestrator's working
/// directory is left alone.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&mut self, invocation: &StepInvocation) -> io::Result<ChildStatus> {
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .status()?;
        Ok(status.into())
    }
}
