#![allow(clippy::module_name_repetitions)]
//! `docker run` construction and preview rendering for REPL and notebook sessions.

use std::fmt;
use std::path::Path;
use std::process::Command;

use crate::config::Settings;
use crate::util::shell_join;

/// Where the workspace is mounted inside the container.
pub const WORKSPACE_MOUNT: &str = "/workspace";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Repl,
    Notebook,
}

impl SessionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Repl => "repl",
            SessionKind::Notebook => "notebook",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct SessionSpec<'a> {
    pub kind: SessionKind,
    pub settings: &'a Settings,
    pub workspace: &'a Path,
    /// Appended after the session's own command.
    pub extra_args: &'a [String],
    pub session_id: &'a str,
}

impl SessionSpec<'_> {
    pub fn container_name(&self) -> String {
        format!("autobounds-{}-{}", self.kind, self.session_id)
    }
}

fn notebook_command(port: u16, mounted: bool) -> Vec<String> {
    let mut cmd = vec![
        "jupyter".to_string(),
        "notebook".to_string(),
        "--ip=0.0.0.0".to_string(),
        format!("--port={port}"),
        "--no-browser".to_string(),
    ];
    if mounted {
        cmd.push(format!("--notebook-dir={WORKSPACE_MOUNT}"));
    }
    cmd
}

/// Arguments passed to the docker binary (everything after `docker`).
pub fn session_args(spec: &SessionSpec<'_>) -> Vec<String> {
    let s = spec.settings;
    let mut args: Vec<String> = vec![
        "run".into(),
        "--rm".into(),
        "-it".into(),
        "--name".into(),
        spec.container_name(),
    ];
    if s.mount_workspace {
        args.push("-v".into());
        args.push(format!("{}:{WORKSPACE_MOUNT}", spec.workspace.display()));
        args.push("-w".into());
        args.push(WORKSPACE_MOUNT.into());
    }
    if spec.kind == SessionKind::Notebook {
        args.push("-p".into());
        args.push(format!("{0}:{0}", s.notebook_port));
    }
    args.push(s.docker_image.clone());
    match spec.kind {
        SessionKind::Repl => args.extend(s.repl_command.iter().cloned()),
        SessionKind::Notebook => args.extend(notebook_command(s.notebook_port, s.mount_workspace)),
    }
    args.extend(spec.extra_args.iter().cloned());
    args
}

/// Build the command and a shell-escaped preview of it.
pub fn build_session_cmd(spec: &SessionSpec<'_>) -> (Command, String) {
    let args = session_args(spec);
    let mut cmd = Command::new(&spec.settings.docker_bin);
    cmd.args(&args);

    let mut words = Vec::with_capacity(args.len() + 1);
    words.push(spec.settings.docker_bin.clone());
    words.extend(args);
    (cmd, shell_join(&words))
}
