//! Bounded subprocess execution

use super::BackendError;
use std::io::{Read, Seek, SeekFrom};
use std::process::{Command, Stdio};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Trailing bytes of a failed command's output kept in the error
const MAX_ERROR_OUTPUT_BYTES: usize = 1024;

/// Captured output of a successful command
#[derive(Debug, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Render a command line for logs and error messages
pub fn describe(cmd: &Command) -> String {
    let mut parts = vec![cmd.get_program().to_string_lossy().into_owned()];
    parts.extend(cmd.get_args().map(|a| a.to_string_lossy().into_owned()));
    parts.join(" ")
}

/// Run `cmd` to completion, killing it once `timeout` elapses.
///
/// stdout and stderr go to anonymous temporary files so a chatty child can
/// never block on a full pipe while we wait on it.
pub fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> Result<CommandOutput, BackendError> {
    let command = describe(cmd);
    let spawn_err = |source| BackendError::Spawn {
        command: command.clone(),
        source,
    };

    let mut stdout = tempfile::tempfile().map_err(spawn_err)?;
    let mut stderr = tempfile::tempfile().map_err(spawn_err)?;
    cmd.stdin(Stdio::null())
        .stdout(stdout.try_clone().map_err(spawn_err)?)
        .stderr(stderr.try_clone().map_err(spawn_err)?);

    tracing::debug!("exec: {command}");
    let mut child = cmd.spawn().map_err(spawn_err)?;
    let status = match child.wait_timeout(timeout).map_err(spawn_err)? {
        Some(status) => status,
        None => {
            if let Err(e) = child.kill() {
                tracing::warn!("failed to kill timed out child: {e}");
            }
            let _ = child.wait();
            return Err(BackendError::Timeout { command, timeout });
        }
    };

    let out = CommandOutput {
        stdout: read_back(&mut stdout),
        stderr: read_back(&mut stderr),
    };
    if status.success() {
        return Ok(out);
    }

    let output = if out.stderr.trim().is_empty() {
        out.stdout
    } else {
        out.stderr
    };
    tracing::debug!("`{command}` failed with {status}");
    Err(BackendError::Failed {
        command,
        code: status.code(),
        output: tail(output.trim(), MAX_ERROR_OUTPUT_BYTES).to_string(),
    })
}

fn read_back(f: &mut std::fs::File) -> String {
    let mut buf = Vec::new();
    let r = f
        .seek(SeekFrom::Start(0))
        .and_then(|_| f.read_to_end(&mut buf));
    match r {
        Ok(_) => String::from_utf8_lossy(&buf).into_owned(),
        Err(e) => {
            tracing::warn!("failed seek+read of captured output: {e}");
            String::new()
        }
    }
}

/// Last `max` bytes of `s`, cut on a char boundary
fn tail(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut start = s.len() - max;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    &s[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        let mut cmd = Command::new("virsh");
        cmd.args(["net-start", "vsa-net"]);
        assert_eq!(describe(&cmd), "virsh net-start vsa-net");
    }

    #[test]
    fn test_tail_keeps_char_boundary() {
        assert_eq!(tail("abc", 10), "abc");
        assert_eq!(tail("abcdef", 3), "def");
        assert_eq!(tail("aé", 1), "");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_captures_stdout() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo hello"]);
        let out = run_with_timeout(&mut cmd, Duration::from_secs(10)).unwrap();
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_reports_exit_status_and_stderr() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo boom >&2; exit 3"]);
        match run_with_timeout(&mut cmd, Duration::from_secs(10)) {
            Err(BackendError::Failed { code, output, .. }) => {
                assert_eq!(code, Some(3));
                assert_eq!(output, "boom");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_run_times_out() {
        let mut cmd = Command::new("sleep");
        cmd.arg("5");
        let err = run_with_timeout(&mut cmd, Duration::from_millis(100)).unwrap_err();
        assert!(matches!(err, BackendError::Timeout { .. }));
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let mut cmd = Command::new("/nonexistent/vsa-no-such-binary");
        let err = run_with_timeout(&mut cmd, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, BackendError::Spawn { .. }));
    }
}
