use crate::steps::Step;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Exit code for usage, configuration and plan-time filesystem errors.
pub const EXIT_CONFIG: i32 = 2;
/// Exit code when the interpreter cannot be started.
pub const EXIT_SPAWN: i32 = 127;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Config Error: {message}")]
    Config { message: String },

    #[error("{step} installer directory not found: {}", path.display())]
    StepDirMissing { step: Step, path: PathBuf },

    #[error("{step} installer script not found: {}", path.display())]
    ScriptMissing { step: Step, path: PathBuf },

    #[error("Failed to start {program} for the {step} step: {source}")]
    Spawn {
        step: Step,
        program: String,
        source: io::Error,
    },

    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SetupError {
    pub fn config(message: impl Into<String>) -> Self {
        SetupError::Config {
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            SetupError::Config { .. }
            | SetupError::StepDirMissing { .. }
            | SetupError::ScriptMissing { .. } => EXIT_CONFIG,
            SetupError::Spawn { .. } => EXIT_SPAWN,
            SetupError::Json(_) => 1,
        }
    }

    pub fn display_localized(&self) -> String {
        match self {
            SetupError::Config { message } => {
                t!("errors.config_error", message = message).to_string()
            }
            SetupError::StepDirMissing { step, path } => t!(
                "errors.step_dir_missing",
                step = step,
                path = path.display()
            )
            .to_string(),
            SetupError::ScriptMissing { step, path } => {
                t!("errors.script_missing", step = step, path = path.display()).to_string()
            }
            SetupError::Spawn {
                step,
                program,
                source,
            } => t!(
                "errors.spawn_failed",
                program = program,
                step = step,
                error = source
            )
            .to_string(),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SetupError>;
