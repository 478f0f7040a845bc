//! External relic-abundance solver.
//!
//! The solver is invoked as `<command...> <param file> [flags]`, where the flag
//! tokens select the active corrections (see [`Corrections::flags`]). Its
//! standard output is returned as text.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use crate::domain::Corrections;
use crate::error::ScanError;

/// How often a running solver is polled when a timeout is configured.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Maximum number of stderr bytes kept in error messages.
const STDERR_TAIL: usize = 2000;

/// Why a single solver invocation failed.
#[derive(Debug)]
pub enum SolverFailure {
    /// The process could not be started.
    Spawn(std::io::Error),
    /// Waiting on the process failed.
    Wait(std::io::Error),
    /// The process exited unsuccessfully.
    Exit { status: String, stderr: String },
    /// The process ran past the configured timeout and was killed.
    Timeout { seconds: u64 },
}

/// Something that produces solver output for a parameter file.
pub trait Solver {
    /// Human readable command, used in logs and errors.
    fn describe(&self) -> String;

    fn run(&self, param_file: &Path, corrections: Corrections) -> Result<String, SolverFailure>;
}

/// Runs the solver as a child process.
#[derive(Debug, Clone)]
pub struct ProcessSolver {
    program: String,
    leading_args: Vec<String>,
    timeout: Option<Duration>,
}

impl ProcessSolver {
    /// `command` is the program followed by any fixed leading arguments.
    pub fn new(command: &[String], timeout: Option<Duration>) -> Result<Self, ScanError> {
        let (program, leading_args) = command.split_first().ok_or(ScanError::EmptySolverCommand)?;
        Ok(Self {
            program: program.clone(),
            leading_args: leading_args.to_vec(),
            timeout,
        })
    }
}

impl Solver for ProcessSolver {
    fn describe(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.leading_args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn run(&self, param_file: &Path, corrections: Corrections) -> Result<String, SolverFailure> {
        let child = Command::new(&self.program)
            .args(&self.leading_args)
            .arg(param_file)
            .args(corrections.flags())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(SolverFailure::Spawn)?;

        let (status, stdout, stderr) = match self.timeout {
            None => {
                let out = child.wait_with_output().map_err(SolverFailure::Wait)?;
                (out.status, out.stdout, out.stderr)
            }
            Some(limit) => wait_with_timeout(child, limit)?,
        };

        if !status.success() {
            return Err(SolverFailure::Exit {
                status: status.to_string(),
                stderr: tail(&String::from_utf8_lossy(&stderr)),
            });
        }
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }
}

/// Wait for `child` and for both of its pipes to close, all within `limit`.
///
/// A background process that inherited the pipes can keep them open after the
/// solver exits; that also counts against the deadline.
fn wait_with_timeout(
    mut child: Child,
    limit: Duration,
) -> Result<(ExitStatus, Vec<u8>, Vec<u8>), SolverFailure> {
    // Drain both pipes on their own threads so a chatty solver cannot block on a full pipe.
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());
    let timeout = || SolverFailure::Timeout {
        seconds: limit.as_secs(),
    };

    let deadline = Instant::now() + limit;
    let status = loop {
        if let Some(status) = child.try_wait().map_err(SolverFailure::Wait)? {
            break status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(timeout());
        }
        thread::sleep(POLL_INTERVAL);
    };

    let stdout = collect_before(&stdout, deadline).ok_or_else(timeout)?;
    let stderr = collect_before(&stderr, deadline).ok_or_else(timeout)?;
    Ok((status, stdout, stderr))
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        let _ = tx.send(buf);
    });
    rx
}

/// Pipe contents, or `None` if the pipe is still open at `deadline`.
fn collect_before(rx: &Receiver<Vec<u8>>, deadline: Instant) -> Option<Vec<u8>> {
    let remaining = deadline.saturating_duration_since(Instant::now());
    rx.recv_timeout(remaining).ok()
}

fn tail(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.len() <= STDERR_TAIL {
        return trimmed.to_string();
    }
    let mut start = trimmed.len() - STDERR_TAIL;
    while !trimmed.is_char_boundary(start) {
        start += 1;
    }
    format!("...{}", &trimmed[start..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_command_is_rejected() {
        assert!(ProcessSolver::new(&[], None).is_err());
    }

    #[test]
    fn describe_joins_command() {
        let solver = ProcessSolver::new(&["sh".to_string(), "stub.sh".to_string()], None).unwrap();
        assert_eq!(solver.describe(), "sh stub.sh");
    }

    #[test]
    fn missing_program_fails_to_spawn() {
        let solver = ProcessSolver::new(&["./definitely-not-a-solver-binary".to_string()], None).unwrap();
        let err = solver.run(Path::new("input.par"), Corrections::Baseline).unwrap_err();
        assert!(matches!(err, SolverFailure::Spawn(_)));
    }

    #[cfg(unix)]
    #[test]
    fn background_process_holding_stdout_counts_against_the_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("solver.sh");
        std::fs::write(&script, "echo 'omega_h^2 = 0.1'\nsleep 10 &\nexit 0\n").unwrap();
        let command = ["sh".to_string(), script.display().to_string()];
        let solver = ProcessSolver::new(&command, Some(Duration::from_millis(300))).unwrap();

        let started = Instant::now();
        let err = solver.run(Path::new("input.par"), Corrections::Baseline).unwrap_err();
        assert!(matches!(err, SolverFailure::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[test]
    fn quick_solver_output_is_collected_under_a_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("solver.sh");
        std::fs::write(&script, "echo \"flags: $*\"\n").unwrap();
        let command = ["sh".to_string(), script.display().to_string()];
        let solver = ProcessSolver::new(&command, Some(Duration::from_secs(10))).unwrap();

        let out = solver.run(Path::new("input.par"), Corrections::BoundState).unwrap();
        assert_eq!(out.trim(), "flags: input.par off on");
    }

    #[test]
    fn tail_keeps_the_end() {
        let long = "x".repeat(STDERR_TAIL + 10) + "END";
        let t = tail(&long);
        assert!(t.starts_with("..."));
        assert!(t.ends_with("END"));
    }
}
