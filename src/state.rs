#![allow(clippy::module_name_repetitions)]
//! Per-workspace persisted state (a small JSON key/value document).
//!
//! The only key in use is the "suppress install prompt" flag. It is set when
//! the user picks "Ignore" on the remediation prompt and is only cleared by
//! `reset-prompt`.

use std::cell::Cell;
use std::env;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::workspace::Workspace;

pub const SUPPRESS_PROMPT_KEY: &str = "autobounds:suppressInstallPrompt";

/// Capability seam for the suppress flag.
pub trait PromptStore {
    fn is_suppressed(&self) -> bool;
    fn set_suppressed(&self, value: bool) -> io::Result<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateDoc {
    #[serde(default)]
    workspace: String,
    #[serde(default)]
    values: Map<String, Value>,
}

/// JSON-file backed store for one workspace.
#[derive(Debug, Clone)]
pub struct WorkspaceState {
    path: PathBuf,
    workspace: PathBuf,
}

/// `$AUTOBOUNDS_STATE_DIR`, else `$XDG_STATE_HOME/autobounds`, else
/// `~/.local/state/autobounds`, else a temp-dir fallback.
pub fn state_dir() -> PathBuf {
    if let Some(dir) = env::var_os("AUTOBOUNDS_STATE_DIR").filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    if let Some(dir) = env::var_os("XDG_STATE_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(dir).join("autobounds");
    }
    match home::home_dir() {
        Some(h) => h.join(".local").join("state").join("autobounds"),
        None => env::temp_dir().join("autobounds-state"),
    }
}

impl WorkspaceState {
    pub fn for_workspace(ws: &Workspace) -> Self {
        Self::in_dir(&state_dir(), ws)
    }

    pub fn in_dir(base: &Path, ws: &Workspace) -> Self {
        Self {
            path: base.join("workspaces").join(format!("{}.json", ws.key())),
            workspace: ws.root().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.read() {
            Ok(doc) => doc.values.get(key).and_then(Value::as_bool),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable workspace state");
                None
            }
        }
    }

    /// Set `key`; `None` removes it. Returns whether the document changed.
    pub fn update(&self, key: &str, value: Option<Value>) -> io::Result<bool> {
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;

        let lock_path = self.path.with_extension("lock");
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)?;
        lock.lock_exclusive()?;

        let result = self.update_locked(key, value);
        let _ = lock.unlock();
        result
    }

    fn update_locked(&self, key: &str, value: Option<Value>) -> io::Result<bool> {
        // A corrupt document is replaced rather than blocking the update.
        let mut doc = self.read().unwrap_or_default();
        let changed = match value {
            Some(v) => doc.values.insert(key.to_string(), v.clone()) != Some(v),
            None => doc.values.remove(key).is_some(),
        };
        if !changed {
            return Ok(false);
        }
        doc.workspace = self.workspace.display().to_string();

        let body = serde_json::to_vec_pretty(&doc).map_err(io::Error::other)?;
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut f = fs::File::create(&tmp)?;
            f.write_all(&body)?;
            f.write_all(b"\n")?;
            f.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(true)
    }

    fn read(&self) -> io::Result<StateDoc> {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(StateDoc::default()),
            Err(e) => Err(e),
        }
    }
}

impl PromptStore for WorkspaceState {
    fn is_suppressed(&self) -> bool {
        self.get_bool(SUPPRESS_PROMPT_KEY).unwrap_or(false)
    }

    fn set_suppressed(&self, value: bool) -> io::Result<()> {
        let v = if value { Some(Value::Bool(true)) } else { None };
        self.update(SUPPRESS_PROMPT_KEY, v).map(|_| ())
    }
}

/// In-process store, for callers that must not touch disk.
#[derive(Debug, Default)]
pub struct MemoryPromptStore {
    suppressed: Cell<bool>,
}

impl MemoryPromptStore {
    pub fn new(suppressed: bool) -> Self {
        Self {
            suppressed: Cell::new(suppressed),
        }
    }
}

impl PromptStore for MemoryPromptStore {
    fn is_suppressed(&self) -> bool {
        self.suppressed.get()
    }

    fn set_suppressed(&self, value: bool) -> io::Result<()> {
        self.suppressed.set(value);
        Ok(())
    }
}
