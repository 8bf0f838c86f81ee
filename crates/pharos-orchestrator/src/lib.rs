//! Pharos Orchestrator
//!
//! Runs a list of audit tasks one at a time and aggregates their scores into
//! a single report.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Orchestrator                          │
//! │  - run(tasks, sink, cancel) → RunSummary                    │
//! │  - Idle → Running → Draining → Complete                     │
//! │  - per-task failures are logged and skipped in place        │
//! └─────────────────────────────────────────────────────────────┘
//!                               │  for each task, in order
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CommandBuilder → AuditExecutor → ArtifactPoller            │
//! │                 → extract_scores → CsvSink::append          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only a report write failure ends a run early. Everything else that can go
//! wrong with a task becomes a [`TaskFailure`] on that task's [`AuditResult`].

mod error;
mod events;
mod orchestrator;
mod result;

pub use error::{FailureKind, RunError, TaskFailure};
pub use events::{ChannelNotifier, NoopNotifier, RunEvent, RunNotifier, RunState};
pub use orchestrator::Orchestrator;
pub use result::{AuditOutcome, AuditResult, RunSummary};
