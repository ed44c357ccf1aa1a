#![allow(clippy::module_name_repetitions)]
//! Docker runtime discovery.

use std::io;
use std::path::PathBuf;

use which::which;

/// Resolve the configured docker binary (name or path) to an executable path.
pub fn container_runtime_path(docker_bin: &str) -> io::Result<PathBuf> {
    which(docker_bin).map_err(|_| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("Docker ({docker_bin}) was not found in PATH."),
        )
    })
}
