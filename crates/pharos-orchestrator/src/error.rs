//! Error types for audit runs.

use std::fmt;

use pharos_artifact::ArtifactError;
use pharos_executor::ExecutorError;
use pharos_report::SinkError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a single task failed. Never ends the run.
#[derive(Debug, Error)]
pub enum TaskFailure {
  /// The audit tool ran and exited non-zero.
  #[error("audit tool exited with code {code}{}", stderr_suffix(.stderr_tail))]
  Exit { code: i32, stderr_tail: String },

  /// The audit tool could not be started or waited on.
  #[error(transparent)]
  Launch(#[from] ExecutorError),

  /// The report never appeared, or could not be read or parsed.
  #[error(transparent)]
  Artifact(#[from] ArtifactError),
}

fn stderr_suffix(tail: &str) -> String {
  match tail.lines().last() {
    Some(line) if !line.is_empty() => format!(": {}", line),
    _ => String::new(),
  }
}

impl TaskFailure {
  pub fn kind(&self) -> FailureKind {
    match self {
      TaskFailure::Exit { .. } => FailureKind::ExitFailure,
      TaskFailure::Launch(_) => FailureKind::LaunchFailure,
      TaskFailure::Artifact(ArtifactError::NotFound { .. }) => FailureKind::ArtifactNotFound,
      TaskFailure::Artifact(_) => FailureKind::MalformedReport,
    }
  }
}

/// Coarse classification of a [`TaskFailure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
  ExitFailure,
  LaunchFailure,
  ArtifactNotFound,
  MalformedReport,
}

impl fmt::Display for FailureKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      FailureKind::ExitFailure => "exit_failure",
      FailureKind::LaunchFailure => "launch_failure",
      FailureKind::ArtifactNotFound => "artifact_not_found",
      FailureKind::MalformedReport => "malformed_report",
    })
  }
}

/// Errors that end a run.
#[derive(Debug, Error)]
pub enum RunError {
  /// The aggregate report could not be written; further rows would be lost.
  #[error("report write failed: {0}")]
  Sink(#[from] SinkError),
}
