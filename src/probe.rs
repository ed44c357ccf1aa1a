#![allow(clippy::module_name_repetitions)]
//! Availability probes: one bounded-time `--version` invocation per candidate.
//!
//! Any failure (spawn error, non-zero exit, timeout) means "unavailable"; the
//! classified error is kept only so callers can log it.

use std::fmt;
use std::io;
use std::time::Duration;

use tracing::{debug, instrument};

use crate::config::Settings;
use crate::util::exec::{ExecError, ExecRequest, ExecService};

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
pub const VERSION_ARG: &str = "--version";

/// Captured output of a successful probe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeOutput {
    pub stdout: String,
    pub stderr: String,
}

impl ProbeOutput {
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Trimmed stdout, else trimmed stderr, else "unknown".
    pub fn version(&self) -> String {
        let out = self.stdout.trim();
        if !out.is_empty() {
            return out.to_string();
        }
        let err = self.stderr.trim();
        if !err.is_empty() {
            return err.to_string();
        }
        "unknown".to_string()
    }
}

#[derive(Debug)]
pub enum ProbeError {
    Spawn {
        program: String,
        source: io::Error,
    },
    Exit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
    Timeout {
        program: String,
        timeout: Duration,
    },
}

impl ProbeError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProbeError::Spawn { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::Spawn { program, source } if source.kind() == io::ErrorKind::NotFound => {
                write!(f, "{program}: command not found")
            }
            ProbeError::Spawn { program, source } => {
                write!(f, "failed to start {program}: {source}")
            }
            ProbeError::Exit {
                program,
                code,
                stderr,
            } => {
                match code {
                    Some(c) => write!(f, "{program} exited with code {c}")?,
                    None => write!(f, "{program} was terminated by a signal")?,
                }
                if stderr.is_empty() {
                    Ok(())
                } else {
                    write!(f, ": {stderr}")
                }
            }
            ProbeError::Timeout { program, timeout } => {
                write!(f, "{program} did not respond within {} ms", timeout.as_millis())
            }
        }
    }
}

impl std::error::Error for ProbeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProbeError::Spawn { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Capability seam for running probe commands.
pub trait ProcessRunner {
    fn probe(&self, program: &str, args: &[&str], timeout: Duration)
        -> Result<ProbeOutput, ProbeError>;
}

/// Runs probes as real child processes.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    exec: ExecService,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProcessRunner for SystemRunner {
    fn probe(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<ProbeOutput, ProbeError> {
        let request = ExecRequest::new(program)
            .args(args.iter().copied())
            .timeout(timeout)
            .capture_output(true);
        let out = self.exec.run(request).map_err(|e| match e {
            ExecError::Spawn { source, .. } => ProbeError::Spawn {
                program: program.to_string(),
                source,
            },
            ExecError::Wait(source) | ExecError::Read(source) => ProbeError::Spawn {
                program: program.to_string(),
                source,
            },
            ExecError::TimedOut { timeout, .. } => ProbeError::Timeout {
                program: program.to_string(),
                timeout,
            },
        })?;
        if !out.status.success() {
            return Err(ProbeError::Exit {
                program: program.to_string(),
                code: out.status.code(),
                stderr: out.stderr.trim().to_string(),
            });
        }
        debug!(
            program,
            elapsed_ms = out.duration.as_millis() as u64,
            "probe succeeded"
        );
        Ok(ProbeOutput {
            stdout: out.stdout,
            stderr: out.stderr,
        })
    }
}

/// `<binary> --version` for the configured (or default) local binary.
#[instrument(level = "debug", skip(runner, settings), fields(program = %settings.local_command()))]
pub fn probe_local(
    runner: &dyn ProcessRunner,
    settings: &Settings,
) -> Result<ProbeOutput, ProbeError> {
    runner.probe(
        settings.local_command(),
        &[VERSION_ARG],
        settings.probe_timeout(),
    )
}

/// `docker --version` for the configured container runtime.
#[instrument(level = "debug", skip(runner, settings), fields(program = %settings.docker_bin))]
pub fn probe_docker(
    runner: &dyn ProcessRunner,
    settings: &Settings,
) -> Result<ProbeOutput, ProbeError> {
    runner.probe(&settings.docker_bin, &[VERSION_ARG], settings.probe_timeout())
}
