//! Audit run results.

use std::path::PathBuf;

use pharos_artifact::ScoreSet;
use pharos_task::AuditTask;

use crate::error::TaskFailure;

/// Terminal state of one task.
#[derive(Debug)]
pub enum AuditOutcome {
  Success(ScoreSet),
  Failed(TaskFailure),
}

/// Result of one task. Exactly one is produced per task that was started.
#[derive(Debug)]
pub struct AuditResult {
  pub task: AuditTask,
  pub outcome: AuditOutcome,
}

impl AuditResult {
  pub fn failure(&self) -> Option<&TaskFailure> {
    match &self.outcome {
      AuditOutcome::Success(_) => None,
      AuditOutcome::Failed(failure) => Some(failure),
    }
  }
}

/// Result of a complete run.
#[derive(Debug)]
pub struct RunSummary {
  /// Location of the closed aggregate report.
  pub report_path: PathBuf,
  /// Tasks in the run, including skipped ones.
  pub total: usize,
  /// Tasks whose row was written to the report.
  pub succeeded: usize,
  /// Failed tasks, in execution order.
  pub failed: Vec<AuditResult>,
  /// Tasks never started because the run was cancelled.
  pub skipped: usize,
}

impl RunSummary {
  pub fn was_cancelled(&self) -> bool {
    self.skipped > 0
  }
}
