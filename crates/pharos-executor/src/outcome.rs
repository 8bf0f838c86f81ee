//! Exit outcome of an audit process.

/// How the audit process terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitOutcome {
  /// Exit code 0.
  Success,
  /// Any other exit. `code` is `-1` when the process was killed by a signal.
  Failure {
    code: i32,
    /// Last lines the tool wrote to stderr, for diagnostics.
    stderr_tail: String,
  },
}
