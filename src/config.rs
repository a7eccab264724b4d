use crate::arg_utils::parse_interpreter;
use crate::error::{Result, SetupError};
use crate::path_utils::{absolutize_from, validate_path_str};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "ns3-setup";
pub const ENV_WAFDIR: &str = "NS3_WAFDIR";
pub const ENV_PYTHON: &str = "NS3_SETUP_PYTHON";
pub const ENV_BASE_DIR: &str = "NS3_SETUP_BASE_DIR";
pub const ENV_CONFIG: &str = "NS3_SETUP_CONFIG";
pub const ENV_LANG: &str = "NS3_SETUP_LANG";

/// Where ns-3 is installed when `--wafdir` is not given.
pub const DEFAULT_WAFDIR: &str = "/ns-3-dev";
pub const DEFAULT_PYTHON: &str = "python";

pub const ADDON_DIR: &str = "ns3-addon";
pub const ADDON_SCRIPT: &str = "addon_setup.py";
pub const ENV_DIR: &str = "ns3-env";
pub const ENV_SCRIPT: &str = "env_setup.py";

pub const PROJECT_CONFIG_FILE: &str = "ns3-setup.toml";
pub const USER_CONFIG_FILE: &str = "config.toml";

/// What to install and where. Built once per invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallConfig {
    pub target_directory: String,
    pub skip_addon: bool,
    pub skip_env: bool,
}

impl InstallConfig {
    pub fn new(target_directory: impl Into<String>) -> Result<Self> {
        let target_directory = target_directory.into();
        if target_directory.is_empty() {
            return Err(SetupError::config(t!("errors.empty_wafdir")));
        }
        validate_path_str(&target_directory)
            .map_err(|e| SetupError::config(t!("errors.invalid_wafdir", error = e)))?;
        Ok(Self {
            target_directory,
            skip_addon: false,
            skip_env: false,
        })
    }

    pub fn skip_addon(mut self, skip: bool) -> Self {
        self.skip_addon = skip;
        self
    }

    pub fn skip_env(mut self, skip: bool) -> Self {
        self.skip_env = skip;
        self
    }
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            target_directory: DEFAULT_WAFDIR.to_string(),
            skip_addon: false,
            skip_env: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// A failed step halts the pipeline.
    #[default]
    Stop,
    /// Later steps still run; the first failure decides the exit code.
    KeepGoing,
    /// Failures are reported but the run always exits 0.
    Ignore,
}

impl FailurePolicy {
    pub fn from_flags(keep_going: bool, ignore_failures: bool) -> Self {
        match (keep_going, ignore_failures) {
            (_, true) => FailurePolicy::Ignore,
            (true, false) => FailurePolicy::KeepGoing,
            (false, false) => FailurePolicy::Stop,
        }
    }
}

/// How to run the steps, as opposed to what they install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Absolute directory holding `ns3-addon/` and `ns3-env/`.
    pub base_dir: PathBuf,
    pub program: String,
    pub program_args: Vec<String>,
    pub dry_run: bool,
    pub failure_policy: FailurePolicy,
}

impl RunOptions {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            program: DEFAULT_PYTHON.to_string(),
            program_args: Vec::new(),
            dry_run: false,
            failure_policy: FailurePolicy::default(),
        }
    }

    pub fn with_interpreter(mut self, command: &str) -> Result<Self> {
        let (program, program_args) = parse_interpreter(command).map_err(|e| {
            SetupError::config(t!(
                "errors.invalid_interpreter",
                command = command,
                error = e
            ))
        })?;
        self.program = program;
        self.program_args = program_args;
        Ok(self)
    }
}

/// Defaults read from a TOML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub wafdir: Option<String>,
    pub python: Option<String>,
    #[serde(default)]
    pub noaddon: bool,
    #[serde(default)]
    pub noenv: bool,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SetupError::config(t!(
                "errors.config_file_invalid",
                path = path.display(),
                error = e
            ))
        })?;
        Self::parse(&content).map_err(|e| {
            SetupError::config(t!(
                "errors.config_file_invalid",
                path = path.display(),
                error = e
            ))
        })
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

pub fn user_config_file() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().join(USER_CONFIG_FILE))
}

/// Pick the config file to load, if any.
///
/// An explicitly named file must exist. Otherwise `<base>/ns3-setup.toml`
/// wins over the per-user file, and neither is required.
pub fn resolve_config_file_with(
    explicit: Option<&Path>,
    base_dir: &Path,
    user_file: Option<&Path>,
) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        validate_path_str(&path.to_string_lossy()).map_err(SetupError::config)?;
        let path = absolutize_from(path, base_dir);
        if !path.is_file() {
            return Err(SetupError::config(t!(
                "errors.config_file_missing",
                path = path.display()
            )));
        }
        return Ok(Some(path));
    }

    let project_file = base_dir.join(PROJECT_CONFIG_FILE);
    if project_file.is_file() {
        return Ok(Some(project_file));
    }

    Ok(user_file.filter(|path| path.is_file()).map(Path::to_path_buf))
}

pub fn resolve_config_file(explicit: Option<&Path>, base_dir: &Path) -> Result<Option<PathBuf>> {
    let user_file = user_config_file();
    resolve_config_file_with(explicit, base_dir, user_file.as_deref())
}

pub fn load_file_config(path: Option<&Path>) -> Result<FileConfig> {
    match path {
        Some(path) => FileConfig::load(path),
        None => Ok(FileConfig::default()),
    }
}

/// Values given on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides<'a> {
    pub wafdir: Option<&'a str>,
    pub python: Option<&'a str>,
    pub noaddon: bool,
    pub noenv: bool,
}

pub fn build_install_config(overrides: &Overrides<'_>, file: &FileConfig) -> Result<InstallConfig> {
    let wafdir = overrides
        .wafdir
        .or(file.wafdir.as_deref())
        .unwrap_or(DEFAULT_WAFDIR);
    Ok(InstallConfig::new(wafdir)?
        .skip_addon(overrides.noaddon || file.noaddon)
        .skip_env(overrides.noenv || file.noenv))
}

pub fn interpreter_command<'a>(overrides: &Overrides<'a>, file: &'a FileConfig) -> &'a str {
    overrides
        .python
        .or(file.python.as_deref())
        .unwrap_or(DEFAULT_PYTHON)
}
