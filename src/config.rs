//! Effective launcher settings.
//!
//! Precedence (lowest to highest): built-in defaults, the workspace config file
//! (`.autobounds.yml` or `--config`), `AUTOBOUNDS_*` environment variables, CLI flags.
//! String values are trimmed and empty strings count as unset.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::probe::DEFAULT_PROBE_TIMEOUT;
use crate::util::split_command_line;

pub const DEFAULT_BINARY: &str = "autobounds";
pub const DEFAULT_IMAGE: &str = "autobounds/autolab:latest";
pub const DEFAULT_DOCKER: &str = "docker";
pub const DEFAULT_NOTEBOOK_PORT: u16 = 8888;
pub const DEFAULT_REPL_COMMAND: &str = "python";
pub const CONFIG_FILE_NAMES: [&str; 2] = [".autobounds.yml", ".autobounds.yaml"];

/// Which backend the user prefers.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    #[default]
    Auto,
    Local,
    Docker,
}

impl ExecutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Auto => "auto",
            ExecutionMode::Local => "local",
            ExecutionMode::Docker => "docker",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(ExecutionMode::Auto),
            "local" => Ok(ExecutionMode::Local),
            "docker" => Ok(ExecutionMode::Docker),
            other => Err(format!(
                "invalid execution mode '{other}' (expected auto, local or docker)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub execution_mode: ExecutionMode,
    /// Explicit local binary; empty means `autobounds` on PATH.
    pub binary_path: String,
    pub docker_image: String,
    pub docker_bin: String,
    pub mount_workspace: bool,
    pub notebook_port: u16,
    pub probe_timeout_ms: u64,
    pub repl_command: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            execution_mode: ExecutionMode::Auto,
            binary_path: String::new(),
            docker_image: DEFAULT_IMAGE.to_string(),
            docker_bin: DEFAULT_DOCKER.to_string(),
            mount_workspace: true,
            notebook_port: DEFAULT_NOTEBOOK_PORT,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT.as_millis() as u64,
            repl_command: vec![DEFAULT_REPL_COMMAND.to_string()],
        }
    }
}

impl Settings {
    /// The command probed and run for the local backend.
    pub fn local_command(&self) -> &str {
        let p = self.binary_path.trim();
        if p.is_empty() {
            DEFAULT_BINARY
        } else {
            p
        }
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Layer the file config and then each override set on top of the defaults.
    pub fn resolve(file: Option<&FileConfig>, layers: &[&Overrides]) -> Result<Self> {
        let mut s = Settings::default();
        if let Some(f) = file {
            s.apply_file(f);
        }
        for layer in layers {
            s.apply(layer);
        }
        s.validate()?;
        Ok(s)
    }

    fn apply_file(&mut self, f: &FileConfig) {
        let as_overrides = Overrides {
            execution_mode: f.execution_mode,
            path: f.path.clone(),
            docker_image: f.docker_image.clone(),
            docker: f.docker.clone(),
            mount_workspace: f.mount_workspace,
            notebook_port: f.notebook_port,
            probe_timeout_ms: f.probe_timeout_ms,
            repl_command: f.repl_command.clone(),
        };
        self.apply(&as_overrides);
    }

    fn apply(&mut self, o: &Overrides) {
        if let Some(m) = o.execution_mode {
            self.execution_mode = m;
        }
        if let Some(p) = non_empty(o.path.as_deref()) {
            self.binary_path = p;
        }
        if let Some(img) = non_empty(o.docker_image.as_deref()) {
            self.docker_image = img;
        }
        if let Some(d) = non_empty(o.docker.as_deref()) {
            self.docker_bin = d;
        }
        if let Some(m) = o.mount_workspace {
            self.mount_workspace = m;
        }
        if let Some(p) = o.notebook_port {
            self.notebook_port = p;
        }
        if let Some(t) = o.probe_timeout_ms {
            self.probe_timeout_ms = t;
        }
        if let Some(cmd) = o.repl_command.as_ref().filter(|c| !c.is_empty()) {
            self.repl_command = cmd.clone();
        }
    }

    fn validate(&self) -> Result<()> {
        if self.notebook_port == 0 {
            bail!("notebook port must be between 1 and 65535");
        }
        if self.probe_timeout_ms == 0 {
            bail!("probe timeout must be greater than zero");
        }
        if self.docker_image.chars().any(char::is_whitespace) {
            bail!("docker image reference '{}' contains whitespace", self.docker_image);
        }
        Ok(())
    }
}

fn non_empty(v: Option<&str>) -> Option<String> {
    v.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// Workspace config file (`.autobounds.yml`). Keys mirror the editor settings.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileConfig {
    pub execution_mode: Option<ExecutionMode>,
    pub path: Option<String>,
    pub docker_image: Option<String>,
    pub docker: Option<String>,
    pub mount_workspace: Option<bool>,
    pub notebook_port: Option<u16>,
    pub probe_timeout_ms: Option<u64>,
    pub repl_command: Option<Vec<String>>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        if contents.trim().is_empty() {
            return Ok(FileConfig::default());
        }
        serde_yaml::from_str(&contents)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Look for a config file directly under `dir`.
    pub fn discover(dir: &Path) -> Result<Option<(PathBuf, Self)>> {
        for name in CONFIG_FILE_NAMES {
            let path = dir.join(name);
            if path.is_file() {
                let cfg = Self::load(&path)?;
                return Ok(Some((path, cfg)));
            }
        }
        Ok(None)
    }
}

/// One layer of optional overrides (environment or CLI).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Overrides {
    pub execution_mode: Option<ExecutionMode>,
    pub path: Option<String>,
    pub docker_image: Option<String>,
    pub docker: Option<String>,
    pub mount_workspace: Option<bool>,
    pub notebook_port: Option<u16>,
    pub probe_timeout_ms: Option<u64>,
    pub repl_command: Option<Vec<String>>,
}

impl Overrides {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build overrides from an arbitrary key lookup (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| non_empty(lookup(k).as_deref());

        let execution_mode = match get("AUTOBOUNDS_EXECUTION_MODE") {
            Some(v) => Some(
                v.parse::<ExecutionMode>()
                    .map_err(anyhow::Error::msg)
                    .context("AUTOBOUNDS_EXECUTION_MODE")?,
            ),
            None => None,
        };
        let mount_workspace = match get("AUTOBOUNDS_MOUNT_WORKSPACE") {
            Some(v) => Some(parse_bool(&v).context("AUTOBOUNDS_MOUNT_WORKSPACE")?),
            None => None,
        };
        let notebook_port = match get("AUTOBOUNDS_NOTEBOOK_PORT") {
            Some(v) => Some(
                v.parse::<u16>()
                    .with_context(|| format!("AUTOBOUNDS_NOTEBOOK_PORT: invalid port '{v}'"))?,
            ),
            None => None,
        };
        let probe_timeout_ms = match get("AUTOBOUNDS_PROBE_TIMEOUT_MS") {
            Some(v) => Some(
                v.parse::<u64>()
                    .with_context(|| format!("AUTOBOUNDS_PROBE_TIMEOUT_MS: invalid value '{v}'"))?,
            ),
            None => None,
        };

        Ok(Overrides {
            execution_mode,
            path: get("AUTOBOUNDS_PATH"),
            docker_image: get("AUTOBOUNDS_DOCKER_IMAGE"),
            docker: get("AUTOBOUNDS_DOCKER"),
            mount_workspace,
            notebook_port,
            probe_timeout_ms,
            repl_command: get("AUTOBOUNDS_REPL_COMMAND").map(|v| split_command_line(&v)),
        })
    }
}

fn parse_bool(v: &str) -> Result<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("invalid boolean '{other}'"),
    }
}

/// Settings together with the config file they were read from, if any.
#[derive(Debug, Clone)]
pub struct LoadedSettings {
    pub settings: Settings,
    pub source: Option<PathBuf>,
}

/// Load settings for a workspace: explicit config file or discovered one,
/// then environment, then CLI overrides.
pub fn load_settings(
    workspace_root: &Path,
    explicit_config: Option<&Path>,
    cli: &Overrides,
) -> Result<LoadedSettings> {
    let file = match explicit_config {
        Some(p) => Some((p.to_path_buf(), FileConfig::load(p)?)),
        None => FileConfig::discover(workspace_root)?,
    };
    let env = Overrides::from_env()?;
    let settings = Settings::resolve(file.as_ref().map(|(_, f)| f), &[&env, cli])?;
    Ok(LoadedSettings {
        settings,
        source: file.map(|(p, _)| p),
    })
}
