#![allow(clippy::module_name_repetitions)]
//! User-facing I/O: the output channel, messages, the remediation prompt, and
//! opening documentation in the user's browser.

use std::io::{self, Write};
use std::process::{Command, Stdio};

use crate::color::{color_enabled_stderr, log_error_stderr, log_info_stderr, log_warn_stderr};
use crate::ui::warn::{prompt_choice, prompts_enabled};

pub const LOG_PREFIX: &str = "autobounds:";
pub const INSTALL_DOCS_URL: &str = "https://github.com/autobounds/autobounds#installation";
pub const REMEDIATION_MESSAGE: &str =
    "Autobounds is not available locally. You can install it or run via Docker.";

/// Answer to the remediation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remediation {
    InstallViaDocker,
    OpenInstallDocs,
    Ignore,
    /// Closed without choosing (Enter, EOF, or non-interactive).
    Dismissed,
}

impl Remediation {
    pub const CHOICES: [Remediation; 3] = [
        Remediation::InstallViaDocker,
        Remediation::OpenInstallDocs,
        Remediation::Ignore,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Remediation::InstallViaDocker => "Install via Docker",
            Remediation::OpenInstallDocs => "Open Install Docs",
            Remediation::Ignore => "Ignore",
            Remediation::Dismissed => "Dismiss",
        }
    }
}

/// Capability seam for everything the launcher shows the user.
pub trait Notifier {
    /// Append one line to the output channel.
    fn log(&self, msg: &str);
    /// Append raw streamed output (no prefix, no newline added).
    fn append(&self, chunk: &str);
    fn info(&self, msg: &str);
    fn error(&self, msg: &str);
    /// Announce a long-running step.
    fn progress(&self, title: &str);
    fn prompt_remediation(&self, message: &str) -> Remediation;
    fn open_external(&self, url: &str) -> io::Result<()>;
}

/// Writes to stderr and prompts on the controlling terminal.
#[derive(Debug, Clone)]
pub struct ConsoleNotifier {
    interactive: bool,
}

impl ConsoleNotifier {
    pub fn new(non_interactive: bool) -> Self {
        Self {
            interactive: !non_interactive && prompts_enabled(),
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }
}

impl Notifier for ConsoleNotifier {
    fn log(&self, msg: &str) {
        tracing::debug!(target: "autobounds::output", "{msg}");
        eprintln!("{LOG_PREFIX} {msg}");
    }

    fn append(&self, chunk: &str) {
        let mut err = io::stderr().lock();
        let _ = err.write_all(chunk.as_bytes());
        let _ = err.flush();
    }

    fn info(&self, msg: &str) {
        log_info_stderr(color_enabled_stderr(), &format!("{LOG_PREFIX} {msg}"));
    }

    fn error(&self, msg: &str) {
        log_error_stderr(color_enabled_stderr(), &format!("{LOG_PREFIX} {msg}"));
    }

    fn progress(&self, title: &str) {
        log_warn_stderr(color_enabled_stderr(), &format!("{LOG_PREFIX} {title}..."));
    }

    fn prompt_remediation(&self, message: &str) -> Remediation {
        if !self.interactive {
            return Remediation::Dismissed;
        }
        let labels: Vec<&str> = Remediation::CHOICES.iter().map(|r| r.label()).collect();
        prompt_choice(message, &labels)
            .map(|i| Remediation::CHOICES[i])
            .unwrap_or(Remediation::Dismissed)
    }

    fn open_external(&self, url: &str) -> io::Result<()> {
        open_url(url)
    }
}

/// Command line that opens `url` with the platform's default handler.
pub fn opener_command(url: &str) -> (String, Vec<String>) {
    if cfg!(target_os = "macos") {
        ("open".into(), vec![url.into()])
    } else if cfg!(windows) {
        (
            "cmd".into(),
            vec!["/C".into(), "start".into(), String::new(), url.into()],
        )
    } else {
        ("xdg-open".into(), vec![url.into()])
    }
}

pub fn open_url(url: &str) -> io::Result<()> {
    let (program, args) = opener_command(url);
    let status = Command::new(&program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("{program} exited with {status}")))
    }
}
