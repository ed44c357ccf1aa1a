//! Error mapping guide:
//! - io::ErrorKind::NotFound and "tool/runtime missing" map to exit code 127; everything else to 1.
//! - Typed errors keep their user-visible text in Display; callers print them once.
use std::fmt;
use std::io;

use crate::probe::ProbeError;
use crate::resolver::Backend;

/// 127 for NotFound (command not found), 1 for all other errors.
pub fn exit_code_for_io_error(e: &io::Error) -> u8 {
    if e.kind() == io::ErrorKind::NotFound {
        127
    } else {
        1
    }
}

/// `check` exit status: 0 when a backend was found, 127 when missing.
pub fn exit_code_for_backend(backend: Backend) -> u8 {
    if backend.is_available() {
        0
    } else {
        127
    }
}

/// Failures that prevent a terminal session from starting.
#[derive(Debug)]
pub enum LaunchError {
    /// The container runtime probe failed.
    DockerUnavailable(ProbeError),
    Io(io::Error),
}

impl From<io::Error> for LaunchError {
    fn from(e: io::Error) -> Self {
        LaunchError::Io(e)
    }
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchError::DockerUnavailable(e) => {
                write!(f, "Docker does not appear to be available ({e}).")
            }
            LaunchError::Io(e) => write!(f, "failed to start container session: {e}"),
        }
    }
}

impl std::error::Error for LaunchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LaunchError::DockerUnavailable(e) => Some(e),
            LaunchError::Io(e) => Some(e),
        }
    }
}

pub fn exit_code_for_launch_error(e: &LaunchError) -> u8 {
    match e {
        LaunchError::DockerUnavailable(_) => 127,
        LaunchError::Io(ioe) => exit_code_for_io_error(ioe),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_127() {
        let e = io::Error::new(io::ErrorKind::NotFound, "nope");
        assert_eq!(exit_code_for_io_error(&e), 127);
        let e = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        assert_eq!(exit_code_for_io_error(&e), 1);
    }

    #[test]
    fn backend_exit_codes() {
        assert_eq!(exit_code_for_backend(Backend::Local), 0);
        assert_eq!(exit_code_for_backend(Backend::Docker), 0);
        assert_eq!(exit_code_for_backend(Backend::Missing), 127);
    }
}
