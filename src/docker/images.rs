#![allow(clippy::module_name_repetitions)]
//! Docker image helpers.

use std::process::{Command, Stdio};

/// Return true if a docker image exists locally (without pulling).
pub fn image_exists(docker_bin: &str, image: &str) -> bool {
    Command::new(docker_bin)
        .args(["image", "inspect", image])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
