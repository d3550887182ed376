//! Shell command execution for checks.
//!
//! Commands run through `sh -c` in the check's working directory with
//! combined stdout/stderr capture, a wall-clock timeout, and an output cap.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use wait_timeout::ChildExt;

/// Limits for command execution in checks.
#[derive(Debug, Clone, Copy)]
pub struct CommandLimits {
    /// Maximum time before killing the command.
    pub timeout: Duration,
    /// Maximum bytes to capture from combined output.
    pub output_limit_bytes: usize,
}

impl CommandLimits {
    /// Default limits: 60s timeout, 50KB output.
    pub fn default_limits() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            output_limit_bytes: 50_000,
        }
    }
}

/// Captured outcome of a shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellOutcome {
    pub passed: bool,
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    /// Combined stdout/stderr, lossy UTF-8, possibly truncated.
    pub output: String,
    pub truncated: bool,
}

/// Run a command string through the shell in `workdir`.
///
/// Pass iff the command exits 0 within the timeout. Spawn failures are
/// errors; non-zero exits are not.
pub fn run_shell(command: &str, workdir: &Path, limits: CommandLimits) -> Result<ShellOutcome> {
    let mut child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(workdir)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("spawn shell command `{command}`"))?;

    // Drain both pipes off-thread so a child writing more than the pipe
    // buffer holds does not block until the deadline.
    let stdout_reader = spawn_reader(child.stdout.take());
    let stderr_reader = spawn_reader(child.stderr.take());

    let mut timed_out = false;
    let status = match child.wait_timeout(limits.timeout)? {
        Some(status) => status,
        None => {
            timed_out = true;
            child.kill().ok();
            child.wait().context("wait after kill")?
        }
    };

    let mut combined = join_reader(stdout_reader).context("read stdout")?;
    combined.extend(join_reader(stderr_reader).context("read stderr")?);

    let truncated = combined.len() > limits.output_limit_bytes;
    if truncated {
        combined.truncate(limits.output_limit_bytes);
    }

    Ok(ShellOutcome {
        passed: !timed_out && status.success(),
        exit_code: status.code(),
        timed_out,
        output: String::from_utf8_lossy(&combined).to_string(),
        truncated,
    })
}

fn spawn_reader<R>(pipe: Option<R>) -> JoinHandle<std::io::Result<Vec<u8>>>
where
    R: Read + Send + 'static,
{
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

fn join_reader(handle: JoinHandle<std::io::Result<Vec<u8>>>) -> Result<Vec<u8>> {
    match handle.join() {
        Ok(bytes) => Ok(bytes?),
        Err(_) => bail!("output reader thread panicked"),
    }
}

/// Build display notes for a shell outcome.
///
/// Output lines are indented under a `command output:` heading. When the
/// command produced no output, a placeholder line names the command and its
/// exit code.
pub fn outcome_notes(command: &str, outcome: &ShellOutcome) -> Vec<String> {
    let mut notes = vec!["command output:".to_string()];
    let output = outcome.output.trim_end_matches('\n');
    if output.is_empty() {
        let code = outcome
            .exit_code
            .map_or_else(|| "none".to_string(), |code| code.to_string());
        notes.push(format!(
            "  command `{command}` exited with return code {code}"
        ));
    } else {
        for line in output.lines() {
            notes.push(format!("  {line}"));
        }
    }
    if outcome.timed_out {
        notes.push(format!("  command `{command}` timed out"));
    }
    if outcome.truncated {
        notes.push("  (output truncated)".to_string());
    }
    notes
}
