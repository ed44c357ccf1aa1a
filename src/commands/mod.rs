use std::process::ExitCode;

use autobounds_launcher::{
    exit_code_for_backend, exit_code_for_io_error, exit_code_for_launch_error, load_settings,
    log_error_stderr, log_info_stderr, open_session, AvailabilityResolver, CheckOptions,
    ConsoleNotifier, DockerPuller, InheritedTerminal, LoadedSettings, Notifier, PromptStore,
    SessionKind, SessionOutcome, SessionRequest, SystemRunner, Workspace, WorkspaceState,
};

use crate::cli::Cli;
use crate::doctor::run_doctor;
use crate::warnings::warn_if_tmp_workspace;

/// Workspace and settings shared by every command.
struct Prepared {
    workspace: Workspace,
    loaded: LoadedSettings,
}

fn prepare(cli: &Cli) -> anyhow::Result<Prepared> {
    let workspace = Workspace::detect()?;
    let loaded = load_settings(workspace.root(), cli.config.as_deref(), &cli.overrides())?;
    if cli.verbose {
        let use_err = autobounds_launcher::color_enabled_stderr();
        log_info_stderr(
            use_err,
            &format!(
                "autobounds: workspace: {} (mode: {})",
                workspace.root().display(),
                loaded.settings.execution_mode
            ),
        );
        if let Some(src) = loaded.source.as_deref() {
            log_info_stderr(use_err, &format!("autobounds: config: {}", src.display()));
        }
    }
    Ok(Prepared { workspace, loaded })
}

fn prepare_or_exit(cli: &Cli) -> Result<Prepared, ExitCode> {
    prepare(cli).map_err(|e| {
        let use_err = autobounds_launcher::color_enabled_stderr();
        log_error_stderr(use_err, &format!("autobounds: {e:#}"));
        ExitCode::from(1)
    })
}

fn check(cli: &Cli, p: &Prepared, json: bool, no_prompt: bool) -> ExitCode {
    let settings = &p.loaded.settings;
    let runner = SystemRunner::new();
    let notifier = ConsoleNotifier::new(cli.non_interactive);
    let store = WorkspaceState::for_workspace(&p.workspace);
    let puller = DockerPuller::new(settings.docker_bin.clone());
    let resolver = AvailabilityResolver::new(settings, &runner, &notifier, &store, &puller);

    let resolution = resolver.check_availability(CheckOptions {
        suppress_prompt: no_prompt,
    });
    if json {
        match serde_json::to_string(&resolution) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                notifier.error(&format!("failed to encode result: {e}"));
                return ExitCode::from(1);
            }
        }
    }
    ExitCode::from(exit_code_for_backend(resolution.backend))
}

pub fn run_check(cli: &Cli, json: bool, no_prompt: bool) -> ExitCode {
    match prepare_or_exit(cli) {
        Ok(p) => check(cli, &p, json, no_prompt),
        Err(code) => code,
    }
}

/// Check run when no subcommand is given. A setup failure is logged and
/// maps to exit 1.
pub fn run_startup_check(cli: &Cli) -> ExitCode {
    match prepare(cli) {
        Ok(p) => check(cli, &p, false, false),
        Err(e) => {
            let use_err = autobounds_launcher::color_enabled_stderr();
            log_error_stderr(
                use_err,
                &format!("autobounds: Failed to run startup check: {e:#}"),
            );
            ExitCode::from(1)
        }
    }
}

pub fn run_pull(cli: &Cli) -> ExitCode {
    let p = match prepare_or_exit(cli) {
        Ok(p) => p,
        Err(code) => return code,
    };
    let settings = &p.loaded.settings;
    let notifier = ConsoleNotifier::new(cli.non_interactive);
    if cli.dry_run {
        notifier.log(&format!(
            "dry-run requested; would run: {} pull {}",
            settings.docker_bin, settings.docker_image
        ));
        return ExitCode::from(0);
    }
    let runner = SystemRunner::new();
    let store = WorkspaceState::for_workspace(&p.workspace);
    let puller = DockerPuller::new(settings.docker_bin.clone());
    let resolver = AvailabilityResolver::new(settings, &runner, &notifier, &store, &puller);
    if resolver.pull_docker_image() {
        ExitCode::from(0)
    } else {
        ExitCode::from(1)
    }
}

pub fn run_session(cli: &Cli, kind: SessionKind, args: &[String]) -> ExitCode {
    let p = match prepare_or_exit(cli) {
        Ok(p) => p,
        Err(code) => return code,
    };
    let settings = &p.loaded.settings;
    let notifier = ConsoleNotifier::new(cli.non_interactive);

    if settings.mount_workspace
        && !warn_if_tmp_workspace(p.workspace.root(), notifier.is_interactive())
    {
        eprintln!("aborted.");
        return ExitCode::from(1);
    }

    let req = SessionRequest {
        kind,
        settings,
        workspace: p.workspace.root(),
        extra_args: args,
        dry_run: cli.dry_run,
    };
    match open_session(&req, &SystemRunner::new(), &notifier, &InheritedTerminal) {
        Ok(SessionOutcome::Previewed(preview)) => {
            eprintln!("autobounds: docker: {preview}");
            eprintln!("autobounds: dry-run requested; not executing Docker.");
            ExitCode::from(0)
        }
        Ok(SessionOutcome::Exited(code)) => ExitCode::from((code & 0xff) as u8),
        Err(e) => {
            notifier.error(&e.to_string());
            ExitCode::from(exit_code_for_launch_error(&e))
        }
    }
}

pub fn run_doctor_command(cli: &Cli) -> ExitCode {
    let p = match prepare_or_exit(cli) {
        Ok(p) => p,
        Err(code) => return code,
    };
    run_doctor(
        &p.loaded.settings,
        p.loaded.source.as_deref(),
        &p.workspace,
        cli.verbose,
    );
    ExitCode::from(0)
}

pub fn run_reset_prompt(cli: &Cli) -> ExitCode {
    let p = match prepare_or_exit(cli) {
        Ok(p) => p,
        Err(code) => return code,
    };
    let use_err = autobounds_launcher::color_enabled_stderr();
    let store = WorkspaceState::for_workspace(&p.workspace);
    match store.set_suppressed(false) {
        Ok(()) => {
            log_info_stderr(
                use_err,
                &format!(
                    "autobounds: install prompt re-enabled for {}.",
                    p.workspace.root().display()
                ),
            );
            ExitCode::from(0)
        }
        Err(e) => {
            log_error_stderr(
                use_err,
                &format!("autobounds: failed to update {}: {e}", store.path().display()),
            );
            ExitCode::from(exit_code_for_io_error(&e))
        }
    }
}
