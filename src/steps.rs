//! The fixed installation pipeline: the addon installer, then the
//! environment installer.
//!
//! Every enabled step is planned up front from one captured base directory,
//! so a step cannot influence where a later step runs.

use crate::arg_utils::join_command_line;
use crate::config::{
    ADDON_DIR, ADDON_SCRIPT, ENV_DIR, ENV_SCRIPT, FailurePolicy, InstallConfig, RunOptions,
};
use crate::error::{EXIT_SPAWN, Result, SetupError};
use crate::runner::{ChildStatus, ProcessRunner};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Addon,
    Env,
}

impl Step {
    /// Execution order. Not configurable.
    pub const ORDER: [Step; 2] = [Step::Addon, Step::Env];

    pub fn dir_name(self) -> &'static str {
        match self {
            Step::Addon => ADDON_DIR,
            Step::Env => ENV_DIR,
        }
    }

    pub fn script_name(self) -> &'static str {
        match self {
            Step::Addon => ADDON_SCRIPT,
            Step::Env => ENV_SCRIPT,
        }
    }

    pub fn is_skipped(self, config: &InstallConfig) -> bool {
        match self {
            Step::Addon => config.skip_addon,
            Step::Env => config.skip_env,
        }
    }

    /// Arguments handed to the installer script.
    pub fn script_args(self, config: &InstallConfig) -> Vec<String> {
        let wafdir = format!("--wafdir={}", config.target_directory);
        match self {
            // The addon installer must not reconfigure or rebuild ns-3 itself.
            Step::Addon => vec![wafdir, "--noreconf".into(), "--norebuild".into()],
            Step::Env => vec![wafdir],
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Addon => f.write_str("addon"),
            Step::Env => f.write_str("env"),
        }
    }
}

/// A fully resolved external command for one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepInvocation {
    pub step: Step,
    pub working_dir: PathBuf,
    pub program: String,
    pub args: Vec<String>,
}

impl StepInvocation {
    pub fn command_line(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(self.program.as_str());
        parts.extend(self.args.iter().map(String::as_str));
        join_command_line(&parts)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedStep {
    Skipped(Step),
    Run(StepInvocation),
}

pub fn plan_step(step: Step, config: &InstallConfig, options: &RunOptions) -> Result<StepInvocation> {
    let working_dir = options.base_dir.join(step.dir_name());
    if !working_dir.is_dir() {
        return Err(SetupError::StepDirMissing {
            step,
            path: working_dir,
        });
    }

    let script = working_dir.join(step.script_name());
    if !script.is_file() {
        return Err(SetupError::ScriptMissing { step, path: script });
    }

    let mut args = options.program_args.clone();
    args.push(step.script_name().to_string());
    args.extend(step.script_args(config));

    Ok(StepInvocation {
        step,
        working_dir,
        program: options.program.clone(),
        args,
    })
}

/// Resolve every step before anything runs. A missing directory for an
/// enabled step fails the whole plan.
pub fn plan(config: &InstallConfig, options: &RunOptions) -> Result<Vec<PlannedStep>> {
    Step::ORDER
        .into_iter()
        .map(|step| {
            if step.is_skipped(config) {
                Ok(PlannedStep::Skipped(step))
            } else {
                plan_step(step, config, options).map(PlannedStep::Run)
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Skipped,
    Planned { command: String, working_dir: PathBuf },
    Succeeded,
    /// `code` is `None` when the installer was killed by a signal.
    Failed { code: Option<i32> },
    /// The interpreter could not be started. Only recorded when failures
    /// are ignored; otherwise the run aborts with `SetupError::Spawn`.
    NotStarted { error: String },
    NotRun,
}

impl StepOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            StepOutcome::Failed { .. } | StepOutcome::NotStarted { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub step: Step,
    pub outcome: StepOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    pub wafdir: String,
    pub failure_policy: FailurePolicy,
    pub steps: Vec<StepRecord>,
    pub exit_code: i32,
}

impl InstallReport {
    fn new(config: &InstallConfig, policy: FailurePolicy) -> Self {
        Self {
            wafdir: config.target_directory.clone(),
            failure_policy: policy,
            steps: Vec::with_capacity(Step::ORDER.len()),
            exit_code: 0,
        }
    }

    fn record(&mut self, step: Step, outcome: StepOutcome) {
        self.steps.push(StepRecord { step, outcome });
    }

    fn finish(mut self) -> Self {
        self.exit_code = match self.failure_policy {
            FailurePolicy::Ignore => 0,
            FailurePolicy::Stop | FailurePolicy::KeepGoing => self
                .steps
                .iter()
                .find_map(|record| match record.outcome {
                    StepOutcome::Failed { code } => Some(code.unwrap_or(1)),
                    StepOutcome::NotStarted { .. } => Some(EXIT_SPAWN),
                    _ => None,
                })
                .unwrap_or(0),
        };
        self
    }

    pub fn outcome(&self, step: Step) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|record| record.step == step)
            .map(|record| &record.outcome)
    }

    pub fn all_skipped(&self) -> bool {
        self.steps
            .iter()
            .all(|record| record.outcome == StepOutcome::Skipped)
    }
}

/// Run the pipeline: plan every step, then execute the enabled ones in
/// order through `runner`.
pub fn run_install<R: ProcessRunner + ?Sized>(
    config: &InstallConfig,
    options: &RunOptions,
    runner: &mut R,
) -> Result<InstallReport> {
    let planned = plan(config, options)?;
    let policy = options.failure_policy;
    let mut report = InstallReport::new(config, policy);
    let mut halted = false;

    for entry in planned {
        let invocation = match entry {
            PlannedStep::Skipped(step) => {
                info!(%step, "step skipped");
                report.record(step, StepOutcome::Skipped);
                continue;
            }
            PlannedStep::Run(invocation) => invocation,
        };
        let step = invocation.step;

        if halted {
            debug!(%step, "not running after earlier failure");
            report.record(step, StepOutcome::NotRun);
            continue;
        }

        if options.dry_run {
            report.record(
                step,
                StepOutcome::Planned {
                    command: invocation.command_line(),
                    working_dir: invocation.working_dir.clone(),
                },
            );
            continue;
        }

        info!(
            %step,
            dir = %invocation.working_dir.display(),
            command = %invocation.command_line(),
            "running installer"
        );
        let outcome = match runner.run(&invocation) {
            Ok(status) => outcome_for(status),
            Err(source) if policy == FailurePolicy::Ignore => {
                warn!(%step, error = %source, "installer could not be started");
                StepOutcome::NotStarted {
                    error: source.to_string(),
                }
            }
            Err(source) => {
                return Err(SetupError::Spawn {
                    step,
                    program: invocation.program,
                    source,
                });
            }
        };

        if outcome.is_failure() {
            warn!(%step, ?outcome, "installer failed");
            halted = policy == FailurePolicy::Stop;
        } else {
            info!(%step, "installer finished");
        }
        report.record(step, outcome);
    }

    Ok(report.finish())
}

fn outcome_for(status: ChildStatus) -> StepOutcome {
    if status.success() {
        StepOutcome::Succeeded
    } else {
        StepOutcome::Failed { code: status.code }
    }
}

/// Human-readable summary, one line per step.
pub fn render_text(report: &InstallReport) -> String {
    if report.all_skipped() {
        return t!("report.nothing_to_do").to_string();
    }

    let mut lines = Vec::with_capacity(report.steps.len() + 1);
    for record in &report.steps {
        let step = record.step;
        let line = match &record.outcome {
            StepOutcome::Skipped => t!("report.skipped", step = step),
            StepOutcome::Planned {
                command,
                working_dir,
            } => t!(
                "report.planned",
                step = step,
                command = command,
                dir = working_dir.display()
            ),
            StepOutcome::Succeeded => t!("report.succeeded", step = step),
            StepOutcome::Failed { code: Some(code) } => {
                t!("report.failed_code", step = step, code = code)
            }
            StepOutcome::Failed { code: None } => t!("report.failed_signal", step = step),
            StepOutcome::NotStarted { error } => {
                t!("report.not_started", step = step, error = error)
            }
            StepOutcome::NotRun => t!("report.not_run", step = step),
        };
        lines.push(line.to_string());

        if report.failure_policy == FailurePolicy::Ignore && record.outcome.is_failure() {
            let status = match &record.outcome {
                StepOutcome::Failed { code: Some(code) } => t!("report.status_code", code = code),
                StepOutcome::Failed { code: None } => t!("report.status_signal"),
                _ => t!("report.status_not_started"),
            };
            lines.push(t!("messages.ignored_failure", step = step, status = status).to_string());
        }
    }
    lines.join("\n")
}
