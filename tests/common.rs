#![allow(dead_code)]

use ns3_setup::config::RunOptions;
use ns3_setup::runner::{ChildStatus, ProcessRunner};
use ns3_setup::steps::{Step, StepInvocation};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A base directory with stub `ns3-addon/` and `ns3-env/` installers.
pub struct TestEnvironment {
    temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Self {
        Self::with_steps(&[Step::Addon, Step::Env])
    }

    pub fn with_steps(steps: &[Step]) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let env = Self { temp_dir };
        for step in steps {
            env.write_script(*step, "");
        }
        env
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn step_dir(&self, step: Step) -> PathBuf {
        self.path().join(step.dir_name())
    }

    pub fn write_script(&self, step: Step, content: &str) -> PathBuf {
        let dir = self.step_dir(step);
        fs::create_dir_all(&dir).expect("Failed to create step directory");
        let script = dir.join(step.script_name());
        fs::write(&script, content).expect("Failed to write step script");
        script
    }

    pub fn options(&self) -> RunOptions {
        RunOptions::new(self.path())
    }
}

/// Records every invocation instead of spawning a process.
#[derive(Default)]
pub struct RecordingRunner {
    pub calls: Vec<StepInvocation>,
    statuses: HashMap<Step, ChildStatus>,
    unspawnable: bool,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exit_with(mut self, step: Step, code: i32) -> Self {
        self.statuses.insert(step, ChildStatus::from_code(code));
        self
    }

    pub fn killed(mut self, step: Step) -> Self {
        self.statuses.insert(step, ChildStatus::signalled());
        self
    }

    pub fn unspawnable(mut self) -> Self {
        self.unspawnable = true;
        self
    }

    pub fn steps(&self) -> Vec<Step> {
        self.calls.iter().map(|call| call.step).collect()
    }
}

impl ProcessRunner for RecordingRunner {
    fn run(&mut self, invocation: &StepInvocation) -> io::Result<ChildStatus> {
        self.calls.push(invocation.clone());
        if self.unspawnable {
            return Err(io::Error::new(io::ErrorKind::NotFound, "python not found"));
        }
        Ok(self
            .statuses
            .get(&invocation.step)
            .copied()
            .unwrap_or(ChildStatus::from_code(0)))
    }
}
