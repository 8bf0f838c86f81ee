//! Orchestrator implementation.

use std::sync::Arc;

use pharos_artifact::{ArtifactPoller, ScoreSet, extract_scores};
use pharos_executor::{AuditExecutor, ExitOutcome};
use pharos_report::{CsvSink, SinkWriter};
use pharos_task::{AuditTask, Clock, CommandBuilder, ProcessInvocation, SystemClock};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::error::{RunError, TaskFailure};
use crate::events::{NoopNotifier, RunEvent, RunNotifier, RunState};
use crate::result::{AuditOutcome, AuditResult, RunSummary};

/// Runs audit tasks strictly one after another and feeds the report.
///
/// Each task goes through build → execute → poll → extract → append. A task
/// that fails at any stage is recorded and skipped; the next task starts as
/// usual. The report is closed exactly once, after every task has finished.
pub struct Orchestrator<E> {
  executor: E,
  builder: CommandBuilder,
  poller: ArtifactPoller,
  clock: Arc<dyn Clock>,
  notifier: Arc<dyn RunNotifier>,
}

impl<E: AuditExecutor> Orchestrator<E> {
  pub fn new(executor: E, builder: CommandBuilder, poller: ArtifactPoller) -> Self {
    Self {
      executor,
      builder,
      poller,
      clock: Arc::new(SystemClock),
      notifier: Arc::new(NoopNotifier),
    }
  }

  /// Replace the clock used to stamp artifact names.
  pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
    self.clock = clock;
    self
  }

  pub fn with_notifier(mut self, notifier: Arc<dyn RunNotifier>) -> Self {
    self.notifier = notifier;
    self
  }

  pub fn executor(&self) -> &E {
    &self.executor
  }

  /// Run every task in order, writing successful ones to `sink`.
  ///
  /// Cancellation is checked before each task: a cancelled run starts no
  /// further tasks but still closes the report. Only a report failure makes
  /// this return an error.
  #[instrument(
    name = "audit_run",
    skip(self, tasks, sink, cancel),
    fields(tasks = tasks.len(), report = %sink.location().display())
  )]
  pub async fn run<W: SinkWriter>(
    &self,
    tasks: Vec<AuditTask>,
    mut sink: CsvSink<W>,
    cancel: CancellationToken,
  ) -> Result<RunSummary, RunError> {
    let total = tasks.len();
    let mut state = RunState::Idle;

    self.transition(&mut state, RunState::Running);
    self.notifier.notify(RunEvent::RunStarted {
      total,
      report_path: sink.location().to_path_buf(),
    });
    info!(total, "run started");

    let mut succeeded = 0;
    let mut failed = Vec::new();
    let mut skipped = 0;

    for (index, task) in tasks.into_iter().enumerate() {
      if cancel.is_cancelled() {
        skipped = total - index;
        warn!(skipped, "run cancelled, remaining tasks not started");
        break;
      }

      self.notifier.notify(RunEvent::TaskStarted {
        index,
        url: task.url.clone(),
        preset: task.preset,
      });
      info!(
        index,
        total,
        url = %task.url,
        preset = %task.preset,
        "task started"
      );

      let result = self.run_task(task).await;
      match &result.outcome {
        AuditOutcome::Success(scores) => {
          sink.append(&result.task, scores).await.map_err(|e| {
            error!(error = %e, "report write failed, aborting run");
            e
          })?;
          succeeded += 1;
          info!(
            url = %result.task.url,
            preset = %result.task.preset,
            performance = scores.performance,
            accessibility = scores.accessibility,
            best_practices = scores.best_practices,
            seo = scores.seo,
            "task succeeded"
          );
          self.notifier.notify(RunEvent::TaskSucceeded {
            index,
            url: result.task.url.clone(),
            preset: result.task.preset,
            scores: *scores,
          });
        }
        AuditOutcome::Failed(failure) => {
          error!(
            url = %result.task.url,
            preset = %result.task.preset,
            kind = %failure.kind(),
            error = %failure,
            "task failed"
          );
          self.notifier.notify(RunEvent::TaskFailed {
            index,
            url: result.task.url.clone(),
            preset: result.task.preset,
            kind: failure.kind(),
            reason: failure.to_string(),
          });
          failed.push(result);
        }
      }
    }

    self.transition(&mut state, RunState::Draining);
    let closed = sink.close().await?;

    self.transition(&mut state, RunState::Complete);
    info!(
      report = %closed.location.display(),
      succeeded,
      failed = failed.len(),
      skipped,
      "run complete"
    );
    self.notifier.notify(RunEvent::RunCompleted {
      report_path: closed.location.clone(),
      succeeded,
      failed: failed.len(),
      skipped,
    });

    Ok(RunSummary {
      report_path: closed.location,
      total,
      succeeded,
      failed,
      skipped,
    })
  }

  /// Run one task to its terminal state. Never fails: every problem becomes
  /// [`AuditOutcome::Failed`].
  #[instrument(
    name = "audit_task",
    skip(self, task),
    fields(url = %task.url, preset = %task.preset)
  )]
  pub async fn run_task(&self, task: AuditTask) -> AuditResult {
    let stamp = self.clock.now();
    let invocation = self.builder.build(&task, &stamp);

    let outcome = match self.audit(&invocation).await {
      Ok(scores) => AuditOutcome::Success(scores),
      Err(failure) => AuditOutcome::Failed(failure),
    };

    AuditResult { task, outcome }
  }

  async fn audit(&self, invocation: &ProcessInvocation) -> Result<ScoreSet, TaskFailure> {
    match self.executor.execute(invocation).await? {
      ExitOutcome::Success => {}
      ExitOutcome::Failure { code, stderr_tail } => {
        return Err(TaskFailure::Exit { code, stderr_tail });
      }
    }

    // Exit does not mean the report is on disk yet.
    let handle = self
      .poller
      .await_artifact(&invocation.artifact.expected)
      .await?;
    let scores = extract_scores(handle).await?;
    Ok(scores)
  }

  fn transition(&self, state: &mut RunState, to: RunState) {
    let from = *state;
    *state = to;
    info!(from = ?from, to = ?to, "run state changed");
    self.notifier.notify(RunEvent::StateChanged { from, to });
  }
}
