//! Audit executor implementation.

use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pharos_task::ProcessInvocation;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, info, instrument};

use crate::error::ExecutorError;
use crate::outcome::ExitOutcome;

/// Maximum stderr captured from the tool (1 MiB).
const MAX_STDERR_BYTES: u64 = 1024 * 1024;

/// Number of stderr lines kept in a failure outcome.
const STDERR_TAIL_LINES: usize = 5;

/// How long stderr may keep draining once the tool itself has exited.
/// Processes the tool leaves behind (a browser) can hold the pipe open.
const STDERR_GRACE: Duration = Duration::from_millis(500);

/// Runs one audit invocation to completion.
#[async_trait]
pub trait AuditExecutor: Send + Sync {
  /// Start the process and wait until it terminates.
  ///
  /// There is no timeout: a tool that never exits blocks the caller.
  async fn execute(&self, invocation: &ProcessInvocation) -> Result<ExitOutcome, ExecutorError>;
}

/// Executes invocations as child processes.
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor;

impl ProcessExecutor {
  pub fn new() -> Self {
    Self
  }
}

#[async_trait]
impl AuditExecutor for ProcessExecutor {
  #[instrument(
    name = "audit_process",
    skip(self, invocation),
    fields(program = %invocation.program)
  )]
  async fn execute(&self, invocation: &ProcessInvocation) -> Result<ExitOutcome, ExecutorError> {
    debug!(command = %invocation, "spawning audit process");

    let mut child = Command::new(&invocation.program)
      .args(&invocation.args)
      .stdin(Stdio::null())
      .stdout(Stdio::null())
      .stderr(Stdio::piped())
      .kill_on_drop(true)
      .spawn()
      .map_err(|source| ExecutorError::Spawn {
        program: invocation.program.clone(),
        source,
      })?;

    // Drain stderr concurrently so a chatty tool cannot block on a full pipe.
    let captured = Arc::new(Mutex::new(Vec::new()));
    let stderr = child.stderr.take();
    let mut stderr_task = tokio::spawn(read_capped(stderr, Arc::clone(&captured)));

    let status = child.wait().await.map_err(|source| ExecutorError::Wait {
      program: invocation.program.clone(),
      source,
    })?;

    if tokio::time::timeout(STDERR_GRACE, &mut stderr_task).await.is_err() {
      debug!("stderr still open after exit, keeping what was captured");
      stderr_task.abort();
    }
    let stderr_bytes = std::mem::take(&mut *captured.lock().unwrap_or_else(|p| p.into_inner()));

    if status.success() {
      info!("audit process exited successfully");
      return Ok(ExitOutcome::Success);
    }

    let code = status.code().unwrap_or(-1);
    let stderr_tail = tail_lines(&String::from_utf8_lossy(&stderr_bytes), STDERR_TAIL_LINES);
    debug!(code, stderr = %stderr_tail, "audit process exited with failure");

    Ok(ExitOutcome::Failure { code, stderr_tail })
  }
}

/// Read a stream to the end into `captured`, keeping at most
/// [`MAX_STDERR_BYTES`]. Bytes past the cap are read and dropped.
async fn read_capped<R: AsyncRead + Unpin>(handle: Option<R>, captured: Arc<Mutex<Vec<u8>>>) {
  let Some(mut h) = handle else {
    return;
  };
  let mut chunk = [0u8; 8192];
  loop {
    let n = match h.read(&mut chunk).await {
      Ok(0) | Err(_) => return,
      Ok(n) => n,
    };
    let mut buf = captured.lock().unwrap_or_else(|p| p.into_inner());
    let room = (MAX_STDERR_BYTES as usize).saturating_sub(buf.len());
    buf.extend_from_slice(&chunk[..n.min(room)]);
  }
}

fn tail_lines(text: &str, count: usize) -> String {
  let lines: Vec<&str> = text
    .lines()
    .map(str::trim_end)
    .filter(|l| !l.is_empty())
    .collect();
  let start = lines.len().saturating_sub(count);
  lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use pharos_task::ExpectedArtifact;

  use super::*;

  fn shell(script: &str) -> ProcessInvocation {
    ProcessInvocation {
      program: "sh".to_string(),
      args: vec!["-c".to_string(), script.to_string()],
      artifact: ExpectedArtifact {
        requested: PathBuf::from("unused.json"),
        expected: PathBuf::from("unused.json"),
      },
    }
  }

  #[tokio::test]
  async fn test_exit_zero_is_success() {
    let outcome = ProcessExecutor::new().execute(&shell("exit 0")).await.unwrap();
    assert_eq!(outcome, ExitOutcome::Success);
  }

  #[tokio::test]
  async fn test_non_zero_exit_is_typed_outcome() {
    let outcome = ProcessExecutor::new()
      .execute(&shell("echo 'chrome crashed' >&2; exit 3"))
      .await
      .unwrap();

    match outcome {
      ExitOutcome::Failure { code, stderr_tail } => {
        assert_eq!(code, 3);
        assert_eq!(stderr_tail, "chrome crashed");
      }
      other => panic!("expected failure, got {:?}", other),
    }
  }

  #[tokio::test]
  async fn test_missing_program_is_spawn_error() {
    let invocation = ProcessInvocation {
      program: "pharos-definitely-not-installed".to_string(),
      ..shell("")
    };

    let err = ProcessExecutor::new().execute(&invocation).await.unwrap_err();
    assert!(matches!(err, ExecutorError::Spawn { .. }));
  }

  #[tokio::test]
  async fn test_leftover_child_does_not_hold_up_exit() {
    let started = std::time::Instant::now();
    let outcome = ProcessExecutor::new()
      .execute(&shell("echo 'launcher failed' >&2; sleep 5 & exit 3"))
      .await
      .unwrap();

    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(
      outcome,
      ExitOutcome::Failure {
        code: 3,
        stderr_tail: "launcher failed".to_string(),
      }
    );
  }

  #[tokio::test]
  async fn test_stderr_is_capped() {
    let outcome = ProcessExecutor::new()
      .execute(&shell("head -c 2000000 /dev/zero | tr '\\0' 'x' >&2; exit 1"))
      .await
      .unwrap();

    match outcome {
      ExitOutcome::Failure { stderr_tail, .. } => {
        assert_eq!(stderr_tail.len(), MAX_STDERR_BYTES as usize);
      }
      other => panic!("expected failure, got {:?}", other),
    }
  }

  #[test]
  fn test_tail_lines() {
    let text = "a\nb\n\nc\nd\ne\nf\n";
    assert_eq!(tail_lines(text, 3), "d\ne\nf");
    assert_eq!(tail_lines("", 3), "");
  }
}
