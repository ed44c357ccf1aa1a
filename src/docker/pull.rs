//! `docker pull` with stdout and stderr streamed into the output channel.

use std::fmt;
use std::io::{self, Read};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;

use tracing::{info, instrument};

use crate::notify::Notifier;

#[derive(Debug)]
pub enum PullError {
    Spawn(io::Error),
    Exit(Option<i32>),
    Io(io::Error),
}

impl fmt::Display for PullError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PullError::Spawn(e) => write!(f, "failed to start docker pull: {e}"),
            PullError::Exit(Some(code)) => write!(f, "docker pull exited with code {code}"),
            PullError::Exit(None) => write!(f, "docker pull was terminated by a signal"),
            PullError::Io(e) => write!(f, "docker pull failed: {e}"),
        }
    }
}

impl std::error::Error for PullError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PullError::Spawn(e) | PullError::Io(e) => Some(e),
            PullError::Exit(_) => None,
        }
    }
}

/// Capability seam for fetching the container image.
pub trait ImagePuller {
    fn pull(&self, image: &str, sink: &dyn Notifier) -> Result<(), PullError>;
}

#[derive(Debug, Clone)]
pub struct DockerPuller {
    docker_bin: String,
}

impl DockerPuller {
    pub fn new(docker_bin: impl Into<String>) -> Self {
        Self {
            docker_bin: docker_bin.into(),
        }
    }
}

fn forward<R: Read + Send + 'static>(
    mut reader: R,
    tx: mpsc::Sender<String>,
) -> thread::JoinHandle<io::Result<()>> {
    thread::spawn(move || {
        let mut buf = [0u8; 4096];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                return Ok(());
            }
            if tx.send(String::from_utf8_lossy(&buf[..n]).into_owned()).is_err() {
                return Ok(());
            }
        }
    })
}

impl ImagePuller for DockerPuller {
    #[instrument(level = "info", skip(self, sink), fields(docker = %self.docker_bin))]
    fn pull(&self, image: &str, sink: &dyn Notifier) -> Result<(), PullError> {
        let mut child = Command::new(&self.docker_bin)
            .args(["pull", image])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(PullError::Spawn)?;

        let (tx, rx) = mpsc::channel::<String>();
        let mut readers = Vec::new();
        if let Some(out) = child.stdout.take() {
            readers.push(forward(out, tx.clone()));
        }
        if let Some(err) = child.stderr.take() {
            readers.push(forward(err, tx.clone()));
        }
        drop(tx);

        // Ends once both pipes are closed.
        for chunk in rx {
            sink.append(&chunk);
        }

        let status = child.wait().map_err(PullError::Io)?;
        for r in readers {
            match r.join() {
                Ok(res) => res.map_err(PullError::Io)?,
                Err(_) => return Err(PullError::Io(io::Error::other("output reader panicked"))),
            }
        }

        info!(code = ?status.code(), "docker pull finished");
        if status.success() {
            Ok(())
        } else {
            Err(PullError::Exit(status.code()))
        }
    }
}
