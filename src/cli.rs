use std::path::PathBuf;

use clap::{Parser, Subcommand};

use autobounds_launcher::{ColorMode, ExecutionMode, Overrides};

fn validate_port(s: &str) -> Result<u16, String> {
    match s.parse::<u16>() {
        Ok(0) | Err(_) => Err("must be a port number between 1 and 65535".to_string()),
        Ok(p) => Ok(p),
    }
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum Command {
    /// Check whether Autobounds is available locally or via Docker (default)
    Check {
        /// Print the resolution as JSON on stdout
        #[arg(long)]
        json: bool,
        /// Do not offer remediation if Autobounds is missing
        #[arg(long = "no-prompt")]
        no_prompt: bool,
    },

    /// Pull the configured Autobounds Docker image
    Pull,

    /// Open an interactive REPL inside the Autobounds container
    Repl {
        /// Additional arguments appended to the REPL command
        #[arg(trailing_var_arg = true)]
        args: Vec<String>,
    },

    /// Start a Jupyter notebook server inside the Autobounds container
    Notebook {
        /// Additional arguments appended to the notebook command
        #[arg(trailing_var_arg = true)]
        args: Vec<String>,
    },

    /// Run diagnostics to check environment and configuration
    Doctor,

    /// Re-enable the install prompt for this workspace
    #[command(name = "reset-prompt")]
    ResetPrompt,
}

#[derive(Parser, Debug)]
#[command(
    name = "autobounds-launcher",
    version,
    about = "Detect Autobounds (local binary or Docker) and open REPL/notebook sessions in its container.",
    after_long_help = "Examples:\n  autobounds-launcher check --json\n  autobounds-launcher --mode docker pull\n  autobounds-launcher --port 9000 notebook\n  autobounds-launcher --dry-run repl -- -i\n"
)]
pub(crate) struct Cli {
    /// Execution mode: auto, local or docker (overrides AUTOBOUNDS_EXECUTION_MODE)
    #[arg(long, value_enum, global = true)]
    pub(crate) mode: Option<ExecutionMode>,

    /// Path to the local autobounds binary (default: autobounds on PATH)
    #[arg(long, global = true)]
    pub(crate) path: Option<String>,

    /// Docker image reference (default: autobounds/autolab:latest)
    #[arg(long, global = true)]
    pub(crate) image: Option<String>,

    /// Docker binary name or path
    #[arg(long, global = true)]
    pub(crate) docker: Option<String>,

    /// Do not mount the workspace into the container
    #[arg(long = "no-mount-workspace", global = true)]
    pub(crate) no_mount_workspace: bool,

    /// Host and container port for the notebook server
    #[arg(long, global = true, value_parser = validate_port)]
    pub(crate) port: Option<u16>,

    /// Read settings from this file instead of <workspace>/.autobounds.yml
    #[arg(long, global = true)]
    pub(crate) config: Option<PathBuf>,

    /// Never prompt; remediation choices are skipped
    #[arg(long = "non-interactive", global = true)]
    pub(crate) non_interactive: bool,

    /// Print detailed execution info
    #[arg(long, global = true)]
    pub(crate) verbose: bool,

    /// Prepare and print what would run, but do not execute
    #[arg(long = "dry-run", global = true)]
    pub(crate) dry_run: bool,

    /// Colorize output: auto|always|never
    #[arg(long, value_enum, global = true)]
    pub(crate) color: Option<ColorMode>,

    #[command(subcommand)]
    pub(crate) command: Option<Command>,
}

impl Cli {
    /// The CLI layer of the settings precedence chain.
    pub(crate) fn overrides(&self) -> Overrides {
        Overrides {
            execution_mode: self.mode,
            path: self.path.clone(),
            docker_image: self.image.clone(),
            docker: self.docker.clone(),
            mount_workspace: self.no_mount_workspace.then_some(false),
            notebook_port: self.port,
            ..Overrides::default()
        }
    }
}
