//! Pharos Artifact
//!
//! The audit tool reports completion through its exit status, but the report
//! it writes may become visible on disk only afterwards. This crate treats the
//! two as separate conditions:
//!
//! - [`ArtifactPoller`] waits, with a bounded number of attempts, until the
//!   expected report exists and hands out an [`ArtifactHandle`].
//! - [`extract_scores`] consumes the handle and reads the four headline
//!   category scores into a [`ScoreSet`].
//!
//! Existence is taken as proof that the report is complete. A report that is
//! still being flushed when it first appears fails extraction as malformed.

mod poller;
mod scores;

pub use poller::{ArtifactHandle, ArtifactPoller};
pub use scores::{Category, ScoreSet, extract_scores, parse_scores};

use std::path::PathBuf;

/// Error type for artifact operations.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
  /// The report never appeared within the polling budget.
  #[error("artifact not found at {path} after {attempts} attempts")]
  NotFound { path: PathBuf, attempts: u32 },

  /// The report exists but could not be read.
  #[error("failed to read artifact {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The report is not valid JSON or lacks a required score.
  #[error("malformed report {path}: {reason}")]
  Malformed { path: PathBuf, reason: String },
}
