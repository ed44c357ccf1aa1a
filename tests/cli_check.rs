#![cfg(unix)]

mod support;

use std::path::Path;
use std::process::{Command, Output};

use support::write_stub;

const MISSING: &str = "/nonexistent/autobounds-test/bin";

/// The launcher with a hermetic environment: no ambient config, state under
/// `state`, workspace pinned to `ws`.
fn launcher(state: &Path, ws: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_autobounds-launcher"));
    for var in [
        "AUTOBOUNDS_EXECUTION_MODE",
        "AUTOBOUNDS_PATH",
        "AUTOBOUNDS_DOCKER",
        "AUTOBOUNDS_DOCKER_IMAGE",
        "AUTOBOUNDS_MOUNT_WORKSPACE",
        "AUTOBOUNDS_NOTEBOOK_PORT",
        "AUTOBOUNDS_PROBE_TIMEOUT_MS",
        "AUTOBOUNDS_REPL_COMMAND",
        "AUTOBOUNDS_LOG",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("AUTOBOUNDS_STATE_DIR", state)
        .env("AUTOBOUNDS_WORKSPACE", ws)
        .env("AUTOBOUNDS_NO_PROMPT", "1")
        .env("NO_COLOR", "1");
    cmd
}

fn describe(out: &Output) -> String {
    format!(
        "status: {:?}\nstdout:\n{}\nstderr:\n{}",
        out.status.code(),
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    )
}

fn json(out: &Output) -> serde_json::Value {
    serde_json::from_slice(&out.stdout).unwrap_or_else(|e| panic!("{e}\n{}", describe(out)))
}

#[test]
fn cli_check_json_reports_local_version() {
    let state = tempfile::tempdir().expect("state");
    let ws = tempfile::tempdir().expect("ws");
    let bin = tempfile::tempdir().expect("bin");
    let local = write_stub(bin.path(), "autobounds", "echo 1.2.0");

    let out = launcher(state.path(), ws.path())
        .env("AUTOBOUNDS_PATH", &local)
        .env("AUTOBOUNDS_DOCKER", MISSING)
        .args(["check", "--json"])
        .output()
        .expect("run check");

    assert_eq!(out.status.code(), Some(0), "{}", describe(&out));
    let v = json(&out);
    assert_eq!(v["backend"], "local");
    assert_eq!(v["mode"], "auto");
    assert_eq!(v["version"], "1.2.0");
    let err = String::from_utf8_lossy(&out.stderr);
    assert!(
        err.contains("autobounds: Local binary detected (version: 1.2.0)."),
        "{}",
        describe(&out)
    );
}

#[test]
fn cli_check_falls_back_to_docker() {
    let state = tempfile::tempdir().expect("state");
    let ws = tempfile::tempdir().expect("ws");
    let bin = tempfile::tempdir().expect("bin");
    let docker = write_stub(bin.path(), "docker", "echo 'Docker version 27.0.1'");

    let out = launcher(state.path(), ws.path())
        .env("AUTOBOUNDS_PATH", MISSING)
        .env("AUTOBOUNDS_DOCKER", &docker)
        .args(["check", "--json", "--image", "autobounds/autolab:2.0"])
        .output()
        .expect("run check");

    assert_eq!(out.status.code(), Some(0), "{}", describe(&out));
    let v = json(&out);
    assert_eq!(v["backend"], "docker");
    assert_eq!(v["image"], "autobounds/autolab:2.0");
    let err = String::from_utf8_lossy(&out.stderr);
    assert!(err.contains("autobounds: Falling back to Docker mode."), "{}", describe(&out));
}

#[test]
fn cli_check_missing_exits_127() {
    let state = tempfile::tempdir().expect("state");
    let ws = tempfile::tempdir().expect("ws");

    let out = launcher(state.path(), ws.path())
        .env("AUTOBOUNDS_PATH", MISSING)
        .env("AUTOBOUNDS_DOCKER", MISSING)
        .args(["--non-interactive", "check", "--json"])
        .output()
        .expect("run check");

    assert_eq!(out.status.code(), Some(127), "{}", describe(&out));
    assert_eq!(json(&out)["backend"], "missing");
    let err = String::from_utf8_lossy(&out.stderr);
    assert!(
        err.contains("Neither a local Autobounds binary nor Docker are available."),
        "{}",
        describe(&out)
    );
}

#[test]
fn cli_mode_flag_overrides_config_file() {
    let state = tempfile::tempdir().expect("state");
    let ws = tempfile::tempdir().expect("ws");
    let bin = tempfile::tempdir().expect("bin");
    let local = write_stub(bin.path(), "autobounds", "echo 1.2.0");
    let docker = write_stub(bin.path(), "docker", "echo 'Docker version 27.0.1'");
    std::fs::write(ws.path().join(".autobounds.yml"), "executionMode: local\n")
        .expect("write config");

    let from_file = launcher(state.path(), ws.path())
        .env("AUTOBOUNDS_PATH", MISSING)
        .env("AUTOBOUNDS_DOCKER", &docker)
        .args(["check", "--json"])
        .output()
        .expect("run check");
    assert_eq!(from_file.status.code(), Some(127), "{}", describe(&from_file));
    assert_eq!(json(&from_file)["mode"], "local");

    let from_flag = launcher(state.path(), ws.path())
        .env("AUTOBOUNDS_PATH", &local)
        .env("AUTOBOUNDS_DOCKER", &docker)
        .args(["--mode", "docker", "check", "--json"])
        .output()
        .expect("run check");
    assert_eq!(from_flag.status.code(), Some(0), "{}", describe(&from_flag));
    let v = json(&from_flag);
    assert_eq!(v["mode"], "docker");
    assert_eq!(v["backend"], "docker");
}

#[test]
fn cli_invalid_config_fails_before_probing() {
    let state = tempfile::tempdir().expect("state");
    let ws = tempfile::tempdir().expect("ws");
    std::fs::write(ws.path().join(".autobounds.yml"), "executionMode: sideways\n")
        .expect("write config");

    let out = launcher(state.path(), ws.path())
        .args(["check"])
        .output()
        .expect("run check");

    assert_eq!(out.status.code(), Some(1), "{}", describe(&out));
    let err = String::from_utf8_lossy(&out.stderr);
    assert!(err.contains("invalid config file"), "{}", describe(&out));
    assert!(!err.contains("Local binary detected"));
}

#[test]
fn cli_without_subcommand_runs_startup_check() {
    let state = tempfile::tempdir().expect("state");
    let ws = tempfile::tempdir().expect("ws");
    let bin = tempfile::tempdir().expect("bin");
    let local = write_stub(bin.path(), "autobounds", "echo 0.9.1");

    let out = launcher(state.path(), ws.path())
        .env("AUTOBOUNDS_PATH", &local)
        .output()
        .expect("run launcher");

    assert_eq!(out.status.code(), Some(0), "{}", describe(&out));
    assert!(out.stdout.is_empty(), "{}", describe(&out));
    let err = String::from_utf8_lossy(&out.stderr);
    assert!(err.contains("Local binary detected (version: 0.9.1)."), "{}", describe(&out));
}

#[test]
fn cli_startup_check_failure_is_logged() {
    let state = tempfile::tempdir().expect("state");
    let ws = tempfile::tempdir().expect("ws");
    std::fs::write(ws.path().join(".autobounds.yml"), "executionMode: sideways\n")
        .expect("write config");

    let out = launcher(state.path(), ws.path())
        .output()
        .expect("run launcher");

    assert_eq!(out.status.code(), Some(1), "{}", describe(&out));
    let err = String::from_utf8_lossy(&out.stderr);
    assert!(err.contains("Failed to run startup check:"), "{}", describe(&out));
    assert!(err.contains("invalid config file"), "{}", describe(&out));
    assert!(!err.contains("panicked"), "{}", describe(&out));
}
