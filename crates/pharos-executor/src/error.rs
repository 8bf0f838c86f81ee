//! Process execution errors.

/// Errors that prevent an exit status from being observed at all.
///
/// A process that runs and exits non-zero is not an error; see
/// [`ExitOutcome::Failure`](crate::ExitOutcome::Failure).
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
  /// The program could not be started (not found, not executable, ...).
  #[error("failed to launch '{program}': {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  /// Waiting on the running process failed.
  #[error("failed to wait for '{program}': {source}")]
  Wait {
    program: String,
    #[source]
    source: std::io::Error,
  },
}
