//! Interactive container sessions (REPL, notebook server).

use std::io;
use std::path::Path;
use std::process::Command;

use tracing::{info, instrument};

use crate::config::Settings;
use crate::docker::{build_session_cmd, SessionKind, SessionSpec};
use crate::errors::LaunchError;
use crate::notify::Notifier;
use crate::probe::{probe_docker, ProcessRunner};
use crate::util::id::create_session_id;

/// Capability seam for starting the session process.
pub trait TerminalLauncher {
    /// Start `cmd` attached to the current terminal and return its exit code.
    fn launch(&self, cmd: Command) -> io::Result<i32>;
}

/// Runs the session in the launcher's own terminal (inherited stdio).
#[derive(Debug, Clone, Copy, Default)]
pub struct InheritedTerminal;

impl TerminalLauncher for InheritedTerminal {
    fn launch(&self, mut cmd: Command) -> io::Result<i32> {
        let status = cmd.status()?;
        Ok(status.code().unwrap_or(1))
    }
}

/// What happened when a session was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Dry run: the command that would have been started.
    Previewed(String),
    /// The container ran and exited with this code.
    Exited(i32),
}

pub struct SessionRequest<'a> {
    pub kind: SessionKind,
    pub settings: &'a Settings,
    pub workspace: &'a Path,
    pub extra_args: &'a [String],
    pub dry_run: bool,
}

/// Verify the container runtime, then start (or preview) the session.
#[instrument(level = "info", skip_all, fields(kind = %req.kind, image = %req.settings.docker_image))]
pub fn open_session(
    req: &SessionRequest<'_>,
    runner: &dyn ProcessRunner,
    notifier: &dyn Notifier,
    launcher: &dyn TerminalLauncher,
) -> Result<SessionOutcome, LaunchError> {
    probe_docker(runner, req.settings).map_err(LaunchError::DockerUnavailable)?;

    let session_id = create_session_id();
    let spec = SessionSpec {
        kind: req.kind,
        settings: req.settings,
        workspace: req.workspace,
        extra_args: req.extra_args,
        session_id: &session_id,
    };
    let (cmd, preview) = build_session_cmd(&spec);
    if req.dry_run {
        return Ok(SessionOutcome::Previewed(preview));
    }

    match req.kind {
        SessionKind::Repl => notifier.log(&format!(
            "Starting REPL in {} (container {}).",
            req.settings.docker_image,
            spec.container_name()
        )),
        SessionKind::Notebook => notifier.log(&format!(
            "Starting notebook server on http://localhost:{} (container {}).",
            req.settings.notebook_port,
            spec.container_name()
        )),
    }
    info!(command = %preview, "launching session");
    let code = launcher.launch(cmd)?;
    Ok(SessionOutcome::Exited(code))
}
