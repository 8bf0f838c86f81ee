//! Run events and notifiers for observability.
//!
//! Events are emitted while a run progresses so consumers can render progress,
//! collect statistics, or assert ordering in tests.

use std::path::PathBuf;

use pharos_artifact::ScoreSet;
use pharos_config::Preset;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::FailureKind;

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
  Idle,
  Running,
  Draining,
  Complete,
}

/// Events emitted during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunEvent {
  /// The run moved to a new state.
  StateChanged { from: RunState, to: RunState },

  /// Tasks were expanded and the report is open.
  RunStarted { total: usize, report_path: PathBuf },

  /// A task is about to run. `index` is its position in the task list.
  TaskStarted {
    index: usize,
    url: String,
    preset: Preset,
  },

  /// A task's row was written to the report.
  TaskSucceeded {
    index: usize,
    url: String,
    preset: Preset,
    scores: ScoreSet,
  },

  /// A task failed and was skipped.
  TaskFailed {
    index: usize,
    url: String,
    preset: Preset,
    kind: FailureKind,
    reason: String,
  },

  /// The report is closed.
  RunCompleted {
    report_path: PathBuf,
    succeeded: usize,
    failed: usize,
    skipped: usize,
  },
}

/// Trait for receiving run events.
pub trait RunNotifier: Send + Sync {
  fn notify(&self, event: RunEvent);
}

/// A notifier that discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl RunNotifier for NoopNotifier {
  fn notify(&self, _event: RunEvent) {}
}

/// A notifier that sends events to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  // One event per state change or task, so an unbounded channel stays small.
  sender: mpsc::UnboundedSender<RunEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<RunEvent>) -> Self {
    Self { sender }
  }
}

impl RunNotifier for ChannelNotifier {
  fn notify(&self, event: RunEvent) {
    // Receiver may have been dropped.
    let _ = self.sender.send(event);
  }
}
