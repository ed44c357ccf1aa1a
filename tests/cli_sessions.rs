#![cfg(unix)]

mod support;

use std::path::Path;
use std::process::{Command, Output};

use autobounds_launcher::{PromptStore, Workspace, WorkspaceState};
use support::write_stub;

fn launcher(state: &Path, ws: &Path, docker: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_autobounds-launcher"));
    for var in [
        "AUTOBOUNDS_EXECUTION_MODE",
        "AUTOBOUNDS_PATH",
        "AUTOBOUNDS_DOCKER_IMAGE",
        "AUTOBOUNDS_MOUNT_WORKSPACE",
        "AUTOBOUNDS_NOTEBOOK_PORT",
        "AUTOBOUNDS_REPL_COMMAND",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("AUTOBOUNDS_STATE_DIR", state)
        .env("AUTOBOUNDS_WORKSPACE", ws)
        .env("AUTOBOUNDS_DOCKER", docker)
        .env("AUTOBOUNDS_NO_PROMPT", "1")
        .env("AUTOBOUNDS_SUPPRESS_TMP_WARNING", "1")
        .env("NO_COLOR", "1");
    cmd
}

fn stderr_of(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn cli_dry_run_repl_previews_docker_cmd() {
    let state = tempfile::tempdir().expect("state");
    let ws = tempfile::tempdir().expect("ws");
    let bin = tempfile::tempdir().expect("bin");
    let docker = write_stub(bin.path(), "docker", "echo 'Docker version 27.0.1'");

    let out = launcher(state.path(), ws.path(), &docker)
        .args(["--dry-run", "repl", "--", "-i"])
        .output()
        .expect("run repl");

    let err = stderr_of(&out);
    assert_eq!(out.status.code(), Some(0), "stderr:\n{err}");
    let preview = err
        .lines()
        .find(|l| l.starts_with("autobounds: docker: "))
        .unwrap_or_else(|| panic!("expected docker preview in stderr, got:\n{err}"));
    let root = Workspace::at(ws.path()).root().display().to_string();
    assert!(preview.contains(" run --rm -it --name autobounds-repl-"), "{preview}");
    assert!(preview.contains(&format!("-v {root}:/workspace -w /workspace")), "{preview}");
    assert!(preview.ends_with("autobounds/autolab:latest python -i"), "{preview}");
    assert!(err.contains("dry-run requested; not executing Docker."));
}

#[test]
fn cli_dry_run_notebook_publishes_port() {
    let state = tempfile::tempdir().expect("state");
    let ws = tempfile::tempdir().expect("ws");
    let bin = tempfile::tempdir().expect("bin");
    let docker = write_stub(bin.path(), "docker", "echo 'Docker version 27.0.1'");

    let out = launcher(state.path(), ws.path(), &docker)
        .args(["--dry-run", "--port", "9000", "--no-mount-workspace", "notebook"])
        .output()
        .expect("run notebook");

    let err = stderr_of(&out);
    assert_eq!(out.status.code(), Some(0), "stderr:\n{err}");
    assert!(err.contains("-p 9000:9000"), "{err}");
    assert!(err.contains("jupyter notebook --ip=0.0.0.0 --port=9000 --no-browser"), "{err}");
    assert!(!err.contains(":/workspace"), "{err}");
    assert!(!err.contains("--notebook-dir"), "{err}");
}

#[test]
fn cli_session_without_docker_exits_127() {
    let state = tempfile::tempdir().expect("state");
    let ws = tempfile::tempdir().expect("ws");

    let out = launcher(
        state.path(),
        ws.path(),
        Path::new("/nonexistent/autobounds-test/docker"),
    )
    .args(["repl"])
    .output()
    .expect("run repl");

    let err = stderr_of(&out);
    assert_eq!(out.status.code(), Some(127), "stderr:\n{err}");
    assert!(err.contains("command not found"), "{err}");
}

#[test]
fn cli_session_forwards_container_exit_code() {
    let state = tempfile::tempdir().expect("state");
    let ws = tempfile::tempdir().expect("ws");
    let bin = tempfile::tempdir().expect("bin");
    let docker = write_stub(
        bin.path(),
        "docker",
        r#"if [ "$1" = "--version" ]; then echo 'Docker version 27.0.1'; exit 0; fi
exit 42"#,
    );

    let out = launcher(state.path(), ws.path(), &docker)
        .args(["repl"])
        .output()
        .expect("run repl");

    assert_eq!(out.status.code(), Some(42), "stderr:\n{}", stderr_of(&out));
    assert!(stderr_of(&out).contains("autobounds: Starting REPL in autobounds/autolab:latest"));
}

#[test]
fn cli_reset_prompt_clears_suppression() {
    let state = tempfile::tempdir().expect("state");
    let ws = tempfile::tempdir().expect("ws");
    let store = WorkspaceState::in_dir(state.path(), &Workspace::at(ws.path()));
    store.set_suppressed(true).expect("suppress");

    let out = launcher(state.path(), ws.path(), Path::new("docker"))
        .arg("reset-prompt")
        .output()
        .expect("run reset-prompt");

    let err = stderr_of(&out);
    assert_eq!(out.status.code(), Some(0), "stderr:\n{err}");
    assert!(err.contains("install prompt re-enabled"), "{err}");
    assert!(!store.is_suppressed());
}

#[test]
fn cli_doctor_exits_zero() {
    let state = tempfile::tempdir().expect("state");
    let ws = tempfile::tempdir().expect("ws");
    let bin = tempfile::tempdir().expect("bin");
    let docker = write_stub(bin.path(), "docker", "echo 'Docker version 27.0.1'");

    let out = launcher(state.path(), ws.path(), &docker)
        .env("AUTOBOUNDS_PATH", "/nonexistent/autobounds-test/autobounds")
        .args(["doctor", "--verbose"])
        .output()
        .expect("run doctor");

    let err = stderr_of(&out);
    assert!(out.status.success(), "doctor exited non-zero:\n{err}");
    assert!(err.contains("docker --version: Docker version 27.0.1"), "{err}");
    assert!(err.contains("autobounds --version: unavailable"), "{err}");
    assert!(err.contains("install prompt: enabled"), "{err}");
    assert!(err.contains("doctor: completed diagnostics."), "{err}");
}
