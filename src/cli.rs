use crate::config::{
    ENV_BASE_DIR, ENV_CONFIG, ENV_PYTHON, ENV_WAFDIR, FailurePolicy, InstallConfig, Overrides,
    RunOptions, build_install_config, interpreter_command, load_file_config, resolve_config_file,
};
use crate::error::SetupError;
use crate::logging::init_tracing;
use crate::path_utils::capture_base_dir;
use crate::runner::{ProcessRunner, SystemRunner};
use crate::steps::{render_text, run_install};
use anyhow::Result;
use clap::{ArgAction, Parser, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// ns-3 installation directory handed to both installers [default: /ns-3-dev]
    #[arg(long, value_name = "PATH", env = ENV_WAFDIR)]
    pub wafdir: Option<String>,

    /// Do not run the addon installer (ns3-addon/addon_setup.py)
    #[arg(long)]
    pub noaddon: bool,

    /// Do not run the environment installer (ns3-env/env_setup.py)
    #[arg(long)]
    pub noenv: bool,

    /// Directory containing ns3-addon/ and ns3-env/ (default: current directory)
    #[arg(short = 'C', long = "base-dir", value_name = "DIR", env = ENV_BASE_DIR)]
    pub base_dir: Option<PathBuf>,

    /// Interpreter command used to run the installer scripts [default: python]
    #[arg(long, value_name = "COMMAND", env = ENV_PYTHON)]
    pub python: Option<String>,

    /// TOML file with default values
    #[arg(long, value_name = "FILE", env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Print the commands that would run without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Run later steps even if an earlier one fails
    #[arg(long, conflicts_with = "ignore_failures")]
    pub keep_going: bool,

    /// Report installer failures but always exit 0
    #[arg(long)]
    pub ignore_failures: bool,

    /// Summary format written to stdout
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub report: ReportFormat,

    /// Increase diagnostic output (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

/// Parse the process arguments and run the installers. Returns the exit code.
pub fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    execute(&cli, &mut SystemRunner)
}

pub fn execute<R: ProcessRunner + ?Sized>(cli: &Cli, runner: &mut R) -> Result<i32> {
    let (config, options) = resolve_settings(cli)?;
    debug!(?config, ?options, "resolved settings");

    let report = run_install(&config, &options, runner)?;
    match cli.report {
        ReportFormat::Text => println!("{}", render_text(&report)),
        ReportFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report).map_err(SetupError::from)?)
        }
    }
    Ok(report.exit_code)
}

/// Layer CLI and environment values over the config file and the defaults.
pub fn resolve_settings(cli: &Cli) -> Result<(InstallConfig, RunOptions), SetupError> {
    let base_dir = capture_base_dir(cli.base_dir.as_deref()).map_err(|e| {
        let shown = cli.base_dir.as_deref().unwrap_or(Path::new("."));
        SetupError::config(t!(
            "errors.invalid_base_dir",
            path = shown.display(),
            error = e
        ))
    })?;

    let config_file = resolve_config_file(cli.config.as_deref(), &base_dir)?;
    if let Some(path) = &config_file {
        debug!(path = %path.display(), "loading config file");
    }
    let file = load_file_config(config_file.as_deref())?;

    let overrides = Overrides {
        wafdir: cli.wafdir.as_deref(),
        python: cli.python.as_deref(),
        noaddon: cli.noaddon,
        noenv: cli.noenv,
    };
    let config = build_install_config(&overrides, &file)?;

    let mut options =
        RunOptions::new(base_dir).with_interpreter(interpreter_command(&overrides, &file))?;
    options.dry_run = cli.dry_run;
    options.failure_policy = FailurePolicy::from_flags(cli.keep_going, cli.ignore_failures);

    Ok((config, options))
}
