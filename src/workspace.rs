//! Workspace root detection and the stable key used for per-workspace state.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// `AUTOBOUNDS_WORKSPACE` if set, else the enclosing git top-level, else the
    /// current directory.
    pub fn detect() -> io::Result<Self> {
        if let Some(dir) = env::var_os("AUTOBOUNDS_WORKSPACE").filter(|v| !v.is_empty()) {
            return Ok(Self::at(PathBuf::from(dir)));
        }
        let cwd = env::current_dir()?;
        Ok(Self::at(git_toplevel(&cwd).unwrap_or(cwd)))
    }

    pub fn at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = fs::canonicalize(&root).unwrap_or(root);
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 16 hex chars; identical for every spelling of the same directory.
    pub fn key(&self) -> String {
        fnv1a64_hex(&normalized_key(&self.root))
    }
}

fn git_toplevel(dir: &Path) -> Option<PathBuf> {
    let out = Command::new("git")
        .args(["rev-parse", "--show-toplevel"])
        .current_dir(dir)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let s = String::from_utf8_lossy(&out.stdout).trim().to_string();
    if s.is_empty() {
        None
    } else {
        Some(PathBuf::from(s))
    }
}

/// Windows paths are case-folded with `\` separators and an uppercase drive
/// letter; elsewhere the path is used as-is.
pub fn normalized_key(p: &Path) -> String {
    let s = p.to_string_lossy().to_string();
    if cfg!(windows) {
        let mut t = s.replace('/', "\\").to_ascii_lowercase();
        if t.len() >= 2 && t.as_bytes()[1] == b':' {
            t[..1].make_ascii_uppercase();
        }
        t
    } else {
        s
    }
}

fn fnv1a64_hex(s: &str) -> String {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let h = s
        .bytes()
        .fold(OFFSET, |h, b| (h ^ u64::from(b)).wrapping_mul(PRIME));
    format!("{h:016x}")
}
