#![cfg(unix)]

mod common;

use common::TestEnvironment;
use ns3_setup::steps::Step;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const RECORD_CALL: &str = "echo \"$(basename \"$(pwd)\") $0 $*\" >> ../calls.log\n";

fn run_setup(base: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ns3-setup"))
        .arg("-C")
        .arg(base)
        .args(["--python", "sh"])
        .args(args)
        .env("HOME", base)
        .env("XDG_CONFIG_HOME", base.join(".config"))
        .env("LANG", "C")
        .env_remove("NS3_WAFDIR")
        .env_remove("NS3_SETUP_PYTHON")
        .env_remove("NS3_SETUP_CONFIG")
        .env_remove("NS3_SETUP_BASE_DIR")
        .env_remove("NS3_SETUP_LANG")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run ns3-setup")
}

fn recording_env() -> TestEnvironment {
    let env = TestEnvironment::new();
    env.write_script(Step::Addon, RECORD_CALL);
    env.write_script(Step::Env, RECORD_CALL);
    env
}

fn calls(env: &TestEnvironment) -> Vec<String> {
    fs::read_to_string(env.path().join("calls.log"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn runs_both_installers_in_order() {
    let env = recording_env();

    let output = run_setup(env.path(), &["--wafdir=/opt/ns3"]);

    assert!(
        output.status.success(),
        "stderr:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        calls(&env),
        vec![
            "ns3-addon addon_setup.py --wafdir=/opt/ns3 --noreconf --norebuild",
            "ns3-env env_setup.py --wafdir=/opt/ns3",
        ]
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[ok] addon"), "{stdout}");
    assert!(stdout.contains("[ok] env"), "{stdout}");
}

#[test]
fn noaddon_runs_only_env_installer() {
    let env = recording_env();

    let output = run_setup(env.path(), &["--wafdir=/opt/ns3", "--noaddon"]);

    assert!(output.status.success());
    assert_eq!(calls(&env), vec!["ns3-env env_setup.py --wafdir=/opt/ns3"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[skipped] addon"), "{stdout}");
}

#[test]
fn default_wafdir_is_passed_through() {
    let env = recording_env();

    let output = run_setup(env.path(), &["--noaddon"]);

    assert!(output.status.success());
    assert_eq!(calls(&env), vec!["ns3-env env_setup.py --wafdir=/ns-3-dev"]);
}

#[test]
fn both_flags_is_a_no_op() {
    let env = TestEnvironment::with_steps(&[]);

    let output = run_setup(env.path(), &["--noaddon", "--noenv"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(calls(&env).is_empty());
}

#[test]
fn installer_exit_code_is_propagated() {
    let env = recording_env();
    env.write_script(Step::Addon, "exit 5\n");

    let output = run_setup(env.path(), &[]);

    assert_eq!(output.status.code(), Some(5));
    assert!(calls(&env).is_empty());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[failed] addon (exit code 5)"), "{stdout}");
    assert!(stdout.contains("[not run] env"), "{stdout}");
}

#[test]
fn ignore_failures_keeps_old_behaviour() {
    let env = recording_env();
    env.write_script(Step::Addon, "exit 5\n");

    let output = run_setup(env.path(), &["--ignore-failures"]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(calls(&env), vec!["ns3-env env_setup.py --wafdir=/ns-3-dev"]);
}

#[test]
fn missing_installer_dir_fails_with_message() {
    let env = TestEnvironment::with_steps(&[Step::Addon]);

    let output = run_setup(env.path(), &[]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ns3-env"), "{stderr}");
}

#[test]
fn dry_run_prints_plan_as_json() {
    let env = recording_env();

    let output = run_setup(env.path(), &["--dry-run", "--report", "json"]);

    assert!(output.status.success());
    assert!(calls(&env).is_empty());
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("json report");
    assert_eq!(report["steps"][0]["outcome"]["status"], "planned");
    assert_eq!(
        report["steps"][0]["outcome"]["command"],
        "sh addon_setup.py --wafdir=/ns-3-dev --noreconf --norebuild"
    );
    assert_eq!(report["steps"][1]["outcome"]["status"], "planned");
}

#[test]
fn unknown_interpreter_exits_127() {
    let env = recording_env();

    let output = Command::new(env!("CARGO_BIN_EXE_ns3-setup"))
        .arg("-C")
        .arg(env.path())
        .args(["--python", "ns3-setup-missing-python"])
        .env("XDG_CONFIG_HOME", env.path().join(".config"))
        .env("LANG", "C")
        .env_remove("NS3_SETUP_CONFIG")
        .output()
        .expect("Failed to run ns3-setup");

    assert_eq!(output.status.code(), Some(127));
}
