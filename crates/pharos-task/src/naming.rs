//! Timestamps and file-name fragments.
//!
//! All naming is a pure function of a [`Stamp`]. Wall-clock access is confined
//! to [`Clock`] so paths stay reproducible in tests.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// A captured point in time, formatted into path components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Stamp(DateTime<Utc>);

impl Stamp {
  pub fn new(at: DateTime<Utc>) -> Self {
    Self(at)
  }

  pub fn at(&self) -> DateTime<Utc> {
    self.0
  }

  /// Date bucket, e.g. `2024-03-09`.
  pub fn date(&self) -> String {
    self.0.format("%Y-%m-%d").to_string()
  }

  /// Second resolution, e.g. `20240309T141503`.
  pub fn run_timestamp(&self) -> String {
    self.0.format("%Y%m%dT%H%M%S").to_string()
  }

  /// Millisecond resolution, e.g. `20240309T141503042`. Used per task so the
  /// desktop and mobile runs of one URL never share an artifact name.
  pub fn task_timestamp(&self) -> String {
    self.0.format("%Y%m%dT%H%M%S%3f").to_string()
  }
}

/// Source of the current time.
pub trait Clock: Send + Sync {
  fn now(&self) -> Stamp;
}

/// The system wall clock, in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> Stamp {
    Stamp(Utc::now())
  }
}

/// A clock that starts at a fixed instant and advances by `step` per reading.
///
/// Useful for tests or reproducible dry runs.
#[derive(Debug)]
pub struct FixedClock {
  next: Mutex<DateTime<Utc>>,
  step: Duration,
}

impl FixedClock {
  pub fn stepping(start: DateTime<Utc>, step: Duration) -> Self {
    Self {
      next: Mutex::new(start),
      step,
    }
  }
}

impl Clock for FixedClock {
  fn now(&self) -> Stamp {
    let mut next = self.next.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let current = *next;
    *next = current + self.step;
    Stamp(current)
  }
}

/// Directory holding everything one run writes: `<output-root>/<run-date>`.
///
/// Derived from the run start stamp only, so a run crossing midnight still
/// writes into a single directory.
pub fn run_dir(output_root: &Path, run_stamp: &Stamp) -> PathBuf {
  output_root.join(run_stamp.date())
}

/// Turn a URL into a file-name fragment.
///
/// The `http://` or `https://` scheme is dropped and path separators, port
/// colons and other characters that are not portable in file names become `_`.
pub fn sanitize_url(url: &str) -> String {
  let trimmed = url.trim();
  let lower = trimmed.to_ascii_lowercase();
  let rest = if lower.starts_with("https://") {
    &trimmed[8..]
  } else if lower.starts_with("http://") {
    &trimmed[7..]
  } else {
    trimmed
  };

  rest
    .chars()
    .map(|c| match c {
      '/' | '\\' | ':' | '?' | '&' | '=' | '#' | '%' | '*' | '<' | '>' | '|' | '"' => '_',
      c if c.is_whitespace() || c.is_control() => '_',
      c => c,
    })
    .collect()
}
