#![allow(clippy::module_name_repetitions)]
//! CLI warnings about the mounted workspace.

use std::path::Path;

fn is_temp_path(s: &str) -> bool {
    let roots: &[&str] = if cfg!(target_os = "macos") {
        &["/tmp", "/private/tmp", "/private/var/folders"]
    } else {
        &["/tmp", "/var/tmp"]
    };
    roots
        .iter()
        .any(|r| s == *r || s.starts_with(&format!("{r}/")))
}

/// Warn when the workspace that will be mounted lives under a temporary path.
/// Returns false when the user chose to abort; always true when not interactive
/// or when `AUTOBOUNDS_SUPPRESS_TMP_WARNING=1`.
pub fn warn_if_tmp_workspace(root: &Path, interactive_block: bool) -> bool {
    if std::env::var("AUTOBOUNDS_SUPPRESS_TMP_WARNING").ok().as_deref() == Some("1") {
        return true;
    }
    let s = root.display().to_string();
    if !is_temp_path(&s) {
        return true;
    }
    let first = format!("workspace is under a temporary path ({s}).");
    let second = if cfg!(target_os = "macos") {
        "many temporary folders on macOS are not shared with Docker Desktop by default."
    } else {
        "some Docker setups do not share temporary folders reliably with containers."
    };
    let lines = [
        first.as_str(),
        second,
        "this can result in an empty or non-writable /workspace inside the container.",
    ];
    if interactive_block {
        autobounds_launcher::warn_prompt_continue_or_quit(&lines)
    } else {
        for l in lines {
            autobounds_launcher::warn_print(l);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::is_temp_path;

    #[test]
    fn detects_temp_roots_only_on_boundaries() {
        assert!(is_temp_path("/tmp"));
        assert!(is_temp_path("/tmp/study"));
        assert!(!is_temp_path("/tmpfoo"));
        assert!(!is_temp_path("/home/me/tmp"));
    }
}
