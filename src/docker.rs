//! Container runtime integration: runtime lookup, image queries, `docker pull`
//! with streamed output, and `docker run` construction for terminal sessions.

pub mod images;
pub mod pull;
pub mod run;
pub mod runtime;

pub use images::image_exists;
pub use pull::{DockerPuller, ImagePuller, PullError};
pub use run::{build_session_cmd, session_args, SessionKind, SessionSpec, WORKSPACE_MOUNT};
pub use runtime::container_runtime_path;
