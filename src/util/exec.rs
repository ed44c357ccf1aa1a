//! Single-shot command execution with captured output and a wall-clock timeout.
//!
//! Both pipes are drained on helper threads that forward chunks over a
//! channel, so a chatty child cannot stall on a full pipe buffer, and a
//! background process that inherited the pipes cannot hold the caller past
//! the deadline.

use std::ffi::OsString;
use std::fmt;
use std::io::{self, Read};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use wait_timeout::ChildExt;

#[derive(Debug, Clone, Copy)]
enum Pipe {
    Stdout,
    Stderr,
}

enum Piece {
    Data(Pipe, Vec<u8>),
    Closed(io::Result<()>),
}

fn forward<R: Read + Send + 'static>(mut reader: R, pipe: Pipe, tx: Sender<Piece>) {
    thread::spawn(move || {
        let mut buf = [0u8; 4096];
        let end = loop {
            match reader.read(&mut buf) {
                Ok(0) => break Ok(()),
                Ok(n) => {
                    if tx.send(Piece::Data(pipe, buf[..n].to_vec())).is_err() {
                        return;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => break Err(e),
            }
        };
        let _ = tx.send(Piece::Closed(end));
    });
}

/// Output gathered by the reader threads.
#[derive(Default)]
struct Collected {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

/// Gather chunks until every pipe is closed or `deadline` passes. A pipe
/// still held open by a background grandchild at the deadline keeps only
/// what arrived before it; its reader is left detached.
fn collect(
    rx: &Receiver<Piece>,
    mut open: usize,
    deadline: Option<Instant>,
) -> Result<Collected, ExecError> {
    let mut got = Collected::default();
    while open > 0 {
        let piece = match deadline {
            None => match rx.recv() {
                Ok(p) => p,
                Err(_) => break,
            },
            Some(at) => {
                let left = at.saturating_duration_since(Instant::now());
                match rx.recv_timeout(left) {
                    Ok(p) => p,
                    Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        };
        match piece {
            Piece::Data(Pipe::Stdout, bytes) => got.stdout.extend_from_slice(&bytes),
            Piece::Data(Pipe::Stderr, bytes) => got.stderr.extend_from_slice(&bytes),
            Piece::Closed(end) => {
                open -= 1;
                end.map_err(ExecError::Read)?;
            }
        }
    }
    Ok(got)
}

#[derive(Debug, Clone)]
pub struct ExecService {
    default_timeout: Duration,
}

impl ExecService {
    pub fn new(default_timeout: Duration) -> Self {
        Self { default_timeout }
    }

    /// Run to completion within the timeout. A zero timeout waits
    /// indefinitely. When the child itself outlives the timeout it is killed
    /// and reaped and its partial output is discarded.
    pub fn run(&self, request: ExecRequest) -> Result<ExecOutput, ExecError> {
        let (out_mode, err_mode) = if request.capture {
            (Stdio::piped(), Stdio::piped())
        } else {
            (Stdio::null(), Stdio::null())
        };
        let mut child = Command::new(&request.program)
            .args(&request.args)
            .stdin(Stdio::null())
            .stdout(out_mode)
            .stderr(err_mode)
            .spawn()
            .map_err(|source| ExecError::Spawn {
                program: request.program.clone(),
                source,
            })?;

        let (tx, rx) = mpsc::channel();
        let mut open = 0;
        if let Some(out) = child.stdout.take() {
            forward(out, Pipe::Stdout, tx.clone());
            open += 1;
        }
        if let Some(err) = child.stderr.take() {
            forward(err, Pipe::Stderr, tx.clone());
            open += 1;
        }
        drop(tx);

        let limit = request.timeout.unwrap_or(self.default_timeout);
        let started = Instant::now();
        let deadline = (!limit.is_zero()).then(|| started + limit);
        let waited = match deadline {
            None => Some(child.wait().map_err(ExecError::Wait)?),
            Some(_) => child.wait_timeout(limit).map_err(ExecError::Wait)?,
        };
        let Some(status) = waited else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(ExecError::TimedOut {
                program: request.program,
                timeout: limit,
            });
        };

        let got = collect(&rx, open, deadline)?;
        Ok(ExecOutput {
            status,
            duration: started.elapsed(),
            stdout: String::from_utf8_lossy(&got.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&got.stderr).into_owned(),
        })
    }
}

impl Default for ExecService {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

/// Program, arguments and limits for one run.
#[derive(Debug, Default)]
pub struct ExecRequest {
    program: OsString,
    args: Vec<OsString>,
    timeout: Option<Duration>,
    capture: bool,
}

impl ExecRequest {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Capture stdout/stderr instead of discarding them.
    pub fn capture_output(mut self, capture: bool) -> Self {
        self.capture = capture;
        self
    }
}

#[derive(Debug)]
pub struct ExecOutput {
    pub status: ExitStatus,
    pub duration: Duration,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug)]
pub enum ExecError {
    Spawn { program: OsString, source: io::Error },
    Wait(io::Error),
    Read(io::Error),
    TimedOut { program: OsString, timeout: Duration },
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecError::Spawn { program, source } => {
                write!(f, "failed to start {}: {source}", program.to_string_lossy())
            }
            ExecError::Wait(e) => write!(f, "failed to wait for process: {e}"),
            ExecError::Read(e) => write!(f, "failed to read process output: {e}"),
            ExecError::TimedOut { program, timeout } => write!(
                f,
                "{} timed out after {} ms",
                program.to_string_lossy(),
                timeout.as_millis()
            ),
        }
    }
}

impl std::error::Error for ExecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecError::Spawn { source, .. } => Some(source),
            ExecError::Wait(e) | ExecError::Read(e) => Some(e),
            ExecError::TimedOut { .. } => None,
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout_and_status() {
        let out = ExecService::default()
            .run(
                ExecRequest::new("sh")
                    .args(["-c", "echo hello; echo oops >&2; exit 3"])
                    .capture_output(true),
            )
            .expect("sh should run");
        assert_eq!(out.status.code(), Some(3));
        assert_eq!(out.stdout.trim(), "hello");
        assert_eq!(out.stderr.trim(), "oops");
    }

    #[test]
    fn large_output_does_not_block_the_child() {
        let out = ExecService::new(Duration::from_secs(10))
            .run(
                ExecRequest::new("sh")
                    .args(["-c", "i=0; while [ $i -lt 20000 ]; do echo line-$i; i=$((i+1)); done"])
                    .capture_output(true),
            )
            .expect("sh should run");
        assert!(out.status.success());
        assert_eq!(out.stdout.lines().count(), 20000);
    }

    #[test]
    fn background_process_holding_pipes_does_not_extend_the_deadline() {
        let started = Instant::now();
        let out = ExecService::new(Duration::from_millis(500))
            .run(
                ExecRequest::new("sh")
                    .args(["-c", "sleep 8 &\necho 1.2.0"])
                    .capture_output(true),
            )
            .expect("sh exits before the deadline");
        assert!(out.status.success());
        assert_eq!(out.stdout.trim(), "1.2.0");
        assert!(
            started.elapsed() < Duration::from_secs(3),
            "run took {:?} with a 500 ms timeout",
            started.elapsed()
        );
    }

    #[test]
    fn kills_process_after_timeout() {
        let err = ExecService::new(Duration::from_millis(100))
            .run(ExecRequest::new("sh").args(["-c", "sleep 5"]))
            .expect_err("sleep should time out");
        assert!(matches!(err, ExecError::TimedOut { .. }), "got {err:?}");
        assert!(err.to_string().contains("timed out after 100 ms"), "{err}");
    }

    #[test]
    fn spawn_failure_keeps_not_found_kind() {
        let err = ExecService::default()
            .run(ExecRequest::new("autobounds-definitely-not-installed-xyz"))
            .expect_err("missing program must fail");
        match err {
            ExecError::Spawn { source, .. } => {
                assert_eq!(source.kind(), io::ErrorKind::NotFound)
            }
            other => panic!("expected spawn failure, got {other:?}"),
        }
    }
}
