//! Availability resolution: decide whether Autobounds runs from a local
//! binary, from the container image, or is missing, and drive remediation
//! when it is missing.

use std::fmt;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::config::{ExecutionMode, Settings};
use crate::docker::ImagePuller;
use crate::notify::{Notifier, Remediation, INSTALL_DOCS_URL, REMEDIATION_MESSAGE};
use crate::probe::{probe_docker, probe_local, ProbeError, ProbeOutput, ProcessRunner};
use crate::state::PromptStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Local,
    Docker,
    Missing,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Local => "local",
            Backend::Docker => "docker",
            Backend::Missing => "missing",
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, Backend::Missing)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one availability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub backend: Backend,
    pub mode: ExecutionMode,
    /// Reported by the local binary (local backend only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Image that will be used (docker backend only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckOptions {
    /// Never show the remediation prompt for this call.
    pub suppress_prompt: bool,
}

pub struct AvailabilityResolver<'a> {
    settings: &'a Settings,
    runner: &'a dyn ProcessRunner,
    notifier: &'a dyn Notifier,
    store: &'a dyn PromptStore,
    puller: &'a dyn ImagePuller,
}

impl<'a> AvailabilityResolver<'a> {
    pub fn new(
        settings: &'a Settings,
        runner: &'a dyn ProcessRunner,
        notifier: &'a dyn Notifier,
        store: &'a dyn PromptStore,
        puller: &'a dyn ImagePuller,
    ) -> Self {
        Self {
            settings,
            runner,
            notifier,
            store,
            puller,
        }
    }

    #[instrument(level = "info", skip(self), fields(mode = %self.settings.execution_mode))]
    pub fn check_availability(&self, options: CheckOptions) -> Resolution {
        let prompt_allowed = !options.suppress_prompt && !self.store.is_suppressed();

        match self.settings.execution_mode {
            ExecutionMode::Local => match probe_local(self.runner, self.settings) {
                Ok(out) => self.local_found(&out),
                Err(e) => {
                    self.report_missing(
                        "Autobounds binary not found in local mode.",
                        Some(&e),
                        prompt_allowed,
                    );
                    self.missing()
                }
            },
            ExecutionMode::Docker => match probe_docker(self.runner, self.settings) {
                Ok(_) => self.docker_found(),
                Err(e) => {
                    self.report_missing(
                        "Docker does not appear to be available.",
                        Some(&e),
                        prompt_allowed,
                    );
                    self.missing()
                }
            },
            ExecutionMode::Auto => {
                let local_err = match probe_local(self.runner, self.settings) {
                    Ok(out) => return self.local_found(&out),
                    Err(e) => e,
                };
                info!(
                    error = %local_err,
                    not_found = local_err.is_not_found(),
                    "local probe failed; trying docker"
                );
                if probe_docker(self.runner, self.settings).is_ok() {
                    self.notifier.log("Falling back to Docker mode.");
                    return self.docker_found();
                }
                self.report_missing(
                    "Neither a local Autobounds binary nor Docker are available.",
                    Some(&local_err),
                    prompt_allowed,
                );
                self.missing()
            }
        }
    }

    /// Pull the configured image, reporting progress and the outcome.
    pub fn pull_docker_image(&self) -> bool {
        let image = self.settings.docker_image.as_str();
        self.notifier.progress(&format!("Pulling {image}"));
        match self.puller.pull(image, self.notifier) {
            Ok(()) => {
                self.notifier
                    .log(&format!("Docker image {image} pulled successfully."));
                self.notifier
                    .info(&format!("Autobounds Docker image {image} pulled successfully."));
                true
            }
            Err(e) => {
                self.notifier
                    .log(&format!("Failed to pull Docker image: {e}"));
                self.notifier
                    .error(&format!("Autobounds Docker pull failed: {e}"));
                false
            }
        }
    }

    fn local_found(&self, out: &ProbeOutput) -> Resolution {
        let version = out.version();
        self.notifier
            .log(&format!("Local binary detected (version: {version})."));
        Resolution {
            backend: Backend::Local,
            mode: self.settings.execution_mode,
            version: Some(version),
            image: None,
        }
    }

    fn docker_found(&self) -> Resolution {
        let image = self.settings.docker_image.clone();
        self.notifier
            .log(&format!("Docker is available. Using image {image}."));
        Resolution {
            backend: Backend::Docker,
            mode: self.settings.execution_mode,
            version: None,
            image: Some(image),
        }
    }

    fn missing(&self) -> Resolution {
        Resolution {
            backend: Backend::Missing,
            mode: self.settings.execution_mode,
            version: None,
            image: None,
        }
    }

    fn report_missing(&self, reason: &str, detail: Option<&ProbeError>, prompt_allowed: bool) {
        self.notifier.log(reason);
        if let Some(e) = detail {
            self.notifier.log(&format!("Details: {e}"));
        }
        if prompt_allowed {
            self.prompt_for_install();
        }
    }

    fn prompt_for_install(&self) {
        match self.notifier.prompt_remediation(REMEDIATION_MESSAGE) {
            Remediation::InstallViaDocker => {
                self.pull_docker_image();
            }
            Remediation::OpenInstallDocs => {
                if let Err(e) = self.notifier.open_external(INSTALL_DOCS_URL) {
                    warn!(error = %e, "could not open browser");
                    self.notifier
                        .log(&format!("Open {INSTALL_DOCS_URL} to install Autobounds."));
                }
            }
            Remediation::Ignore => {
                if let Err(e) = self.store.set_suppressed(true) {
                    self.notifier
                        .error(&format!("Failed to remember prompt preference: {e}"));
                }
            }
            Remediation::Dismissed => {}
        }
    }
}
