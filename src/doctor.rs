use std::path::Path;

use autobounds_launcher::{
    color_enabled_stderr, container_runtime_path, image_exists, paint, probe_docker, probe_local,
    PromptStore, Settings, SystemRunner, Workspace, WorkspaceState,
};

fn value(use_color: bool, s: &str) -> String {
    paint(use_color, "\x1b[34;1m", s)
}

pub fn run_doctor(
    settings: &Settings,
    config_source: Option<&Path>,
    workspace: &Workspace,
    verbose: bool,
) {
    let use_err = color_enabled_stderr();
    eprintln!("autobounds-launcher doctor");
    eprintln!();
    eprintln!("  version: v{}", env!("CARGO_PKG_VERSION"));
    eprintln!(
        "  host:    {} / {}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    if verbose {
        eprintln!(
            "  build:   {} ({}, {}) rev {}",
            env!("AUTOBOUNDS_BUILD_TARGET"),
            env!("AUTOBOUNDS_BUILD_PROFILE"),
            env!("AUTOBOUNDS_BUILD_RUSTC"),
            env!("AUTOBOUNDS_BUILD_REVISION")
        );
    }
    eprintln!();

    eprintln!(
        "  workspace:      {}",
        value(use_err, &workspace.root().display().to_string())
    );
    eprintln!("  workspace key:  {}", workspace.key());
    match config_source {
        Some(p) => eprintln!("  config file:    {}", p.display()),
        None => eprintln!("  config file:    (none)"),
    }
    eprintln!(
        "  execution mode: {}",
        value(use_err, settings.execution_mode.as_str())
    );
    eprintln!("  docker image:   {}", settings.docker_image);
    eprintln!(
        "  mount workspace: {}",
        if settings.mount_workspace { "yes" } else { "no" }
    );
    eprintln!("  notebook port:  {}", settings.notebook_port);
    eprintln!("  probe timeout:  {} ms", settings.probe_timeout_ms);
    eprintln!();

    let runner = SystemRunner::new();

    let local = settings.local_command();
    match which::which(local) {
        Ok(p) => eprintln!("  autobounds:     {}", p.display()),
        Err(_) => eprintln!("  autobounds:     {local} (not found in PATH)"),
    }
    match probe_local(&runner, settings) {
        Ok(out) => eprintln!(
            "  autobounds --version: {}",
            value(use_err, &out.version())
        ),
        Err(e) => eprintln!("  autobounds --version: unavailable ({e})"),
    }

    match container_runtime_path(&settings.docker_bin) {
        Ok(p) => eprintln!("  docker:         {}", p.display()),
        Err(e) => eprintln!("  docker:         not found ({e})"),
    }
    match probe_docker(&runner, settings) {
        Ok(out) => {
            eprintln!("  docker --version: {}", value(use_err, &out.version()));
            let present = image_exists(&settings.docker_bin, &settings.docker_image);
            eprintln!(
                "  image present locally: {}",
                value(use_err, if present { "yes" } else { "no" })
            );
        }
        Err(e) => eprintln!("  docker --version: unavailable ({e})"),
    }
    eprintln!();

    let state = WorkspaceState::for_workspace(workspace);
    eprintln!("  state file:     {}", state.path().display());
    eprintln!(
        "  install prompt: {}",
        if state.is_suppressed() {
            "suppressed (run `autobounds-launcher reset-prompt` to re-enable)"
        } else {
            "enabled"
        }
    );
    eprintln!();
    eprintln!("doctor: completed diagnostics.");
}
