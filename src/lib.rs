//! Host-side launcher for the Autobounds analysis tool.
//!
//! The launcher decides whether Autobounds can run here and how, by probing a
//! local binary and the Docker runtime according to the configured execution
//! mode. When neither works it offers remediation choices, one of which stops
//! the prompt for the current workspace. It also opens interactive REPL and
//! notebook sessions inside the container image.
//!
//! Host interactions sit behind small traits so the decision logic can be
//! exercised without a terminal or Docker: [`ProcessRunner`], [`Notifier`],
//! [`PromptStore`], [`ImagePuller`] and [`TerminalLauncher`].

pub mod color;
pub mod config;
pub mod docker;
pub mod errors;
pub mod notify;
pub mod probe;
pub mod resolver;
pub mod state;
pub mod telemetry;
pub mod terminal;
pub mod ui;
pub mod util;
pub mod workspace;

pub use color::{
    color_enabled_stderr, log_error_stderr, log_info_stderr,
    log_warn_stderr, paint, set_color_mode, ColorMode,
};
pub use config::{load_settings, ExecutionMode, FileConfig, LoadedSettings, Overrides, Settings};
pub use docker::{
    build_session_cmd, container_runtime_path, image_exists, session_args, DockerPuller,
    ImagePuller, PullError, SessionKind, SessionSpec,
};
pub use errors::{
    exit_code_for_backend, exit_code_for_io_error, exit_code_for_launch_error, LaunchError,
};
pub use notify::{ConsoleNotifier, Notifier, Remediation, INSTALL_DOCS_URL, REMEDIATION_MESSAGE};
pub use probe::{
    probe_docker, probe_local, ProbeError, ProbeOutput, ProcessRunner, SystemRunner,
    DEFAULT_PROBE_TIMEOUT,
};
pub use resolver::{AvailabilityResolver, Backend, CheckOptions, Resolution};
pub use state::{state_dir, MemoryPromptStore, PromptStore, WorkspaceState, SUPPRESS_PROMPT_KEY};
pub use telemetry::telemetry_init;
pub use terminal::{open_session, InheritedTerminal, SessionOutcome, SessionRequest, TerminalLauncher};
pub use ui::warn::{prompts_enabled, warn_print, warn_prompt_continue_or_quit};
pub use util::{shell_escape, shell_join};
pub use workspace::Workspace;
