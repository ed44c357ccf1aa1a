/*!
Test support helpers shared across integration tests.

- write_stub(dir, name, body): drop an executable shell script into a directory
- Recorder: Notifier that records every line and answers prompts from a script
- FakePuller: ImagePuller that records requested images

Stubs are POSIX shell scripts; tests using them are unix-only.
*/

use std::cell::{Cell, RefCell};
use std::io;
use std::path::{Path, PathBuf};

use autobounds_launcher::{ImagePuller, Notifier, PullError, Remediation};

/// Write an executable script named `name` into `dir` and return its path.
#[cfg(unix)]
#[allow(dead_code)]
pub fn write_stub(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write stub");
    let mut perms = std::fs::metadata(&path).expect("metadata").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("chmod stub");
    path
}

/// Records output-channel lines and user messages.
#[derive(Default)]
#[allow(dead_code)]
pub struct Recorder {
    pub lines: RefCell<Vec<String>>,
    pub appended: RefCell<String>,
    pub infos: RefCell<Vec<String>>,
    pub errors: RefCell<Vec<String>>,
    pub opened: RefCell<Vec<String>>,
    pub prompts: Cell<usize>,
    pub answers: RefCell<Vec<Remediation>>,
}

#[allow(dead_code)]
impl Recorder {
    /// Answer successive prompts with `answers`, then dismiss.
    pub fn answering(answers: &[Remediation]) -> Self {
        let mut v = answers.to_vec();
        v.reverse();
        Self {
            answers: RefCell::new(v),
            ..Self::default()
        }
    }

    pub fn has_line(&self, needle: &str) -> bool {
        self.lines.borrow().iter().any(|l| l.contains(needle))
    }
}

impl Notifier for Recorder {
    fn log(&self, msg: &str) {
        self.lines.borrow_mut().push(msg.to_string());
    }

    fn append(&self, chunk: &str) {
        self.appended.borrow_mut().push_str(chunk);
    }

    fn info(&self, msg: &str) {
        self.infos.borrow_mut().push(msg.to_string());
    }

    fn error(&self, msg: &str) {
        self.errors.borrow_mut().push(msg.to_string());
    }

    fn progress(&self, title: &str) {
        self.lines.borrow_mut().push(format!("[progress] {title}"));
    }

    fn prompt_remediation(&self, _message: &str) -> Remediation {
        self.prompts.set(self.prompts.get() + 1);
        self.answers
            .borrow_mut()
            .pop()
            .unwrap_or(Remediation::Dismissed)
    }

    fn open_external(&self, url: &str) -> io::Result<()> {
        self.opened.borrow_mut().push(url.to_string());
        Ok(())
    }
}

/// Records pulls; succeeds unless constructed with `failing`.
#[derive(Default)]
#[allow(dead_code)]
pub struct FakePuller {
    pub pulled: RefCell<Vec<String>>,
    pub fail: bool,
}

#[allow(dead_code)]
impl FakePuller {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl ImagePuller for FakePuller {
    fn pull(&self, image: &str, sink: &dyn Notifier) -> Result<(), PullError> {
        self.pulled.borrow_mut().push(image.to_string());
        sink.append("latest: Pulling from autobounds/autolab\n");
        if self.fail {
            Err(PullError::Exit(Some(1)))
        } else {
            Ok(())
        }
    }
}
