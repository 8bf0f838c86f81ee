use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::fs;
use tracing::debug;

use crate::ArtifactError;

/// A report file confirmed to exist on disk.
///
/// Only [`ArtifactPoller::await_artifact`] creates handles, and extraction
/// consumes them, so a handle is read at most once.
#[derive(Debug)]
pub struct ArtifactHandle {
  path: PathBuf,
}

impl ArtifactHandle {
  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn into_path(self) -> PathBuf {
    self.path
  }
}

/// Bounded existence poll.
#[derive(Debug, Clone)]
pub struct ArtifactPoller {
  attempts: u32,
  interval: Duration,
}

impl ArtifactPoller {
  /// `attempts` is clamped to at least one check.
  pub fn new(attempts: u32, interval: Duration) -> Self {
    Self {
      attempts: attempts.max(1),
      interval,
    }
  }

  /// Wait until `path` exists as a regular file.
  ///
  /// The first check runs immediately; later ones are spaced by the interval.
  pub async fn await_artifact(&self, path: &Path) -> Result<ArtifactHandle, ArtifactError> {
    for attempt in 1..=self.attempts {
      if is_file(path).await {
        debug!(path = %path.display(), attempt, "artifact found");
        return Ok(ArtifactHandle {
          path: path.to_path_buf(),
        });
      }

      debug!(path = %path.display(), attempt, "artifact not there yet");
      if attempt < self.attempts {
        tokio::time::sleep(self.interval).await;
      }
    }

    debug!(
      path = %path.display(),
      attempts = self.attempts,
      "artifact polling budget exhausted"
    );
    Err(ArtifactError::NotFound {
      path: path.to_path_buf(),
      attempts: self.attempts,
    })
  }
}

async fn is_file(path: &Path) -> bool {
  fs::metadata(path)
    .await
    .map(|meta| meta.is_file())
    .unwrap_or(false)
}

#[cfg(test)]
mod tests {
  use std::time::Instant;

  use super::*;

  #[tokio::test]
  async fn test_existing_file_found_on_first_attempt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    fs::write(&path, "{}").await.unwrap();

    let poller = ArtifactPoller::new(5, Duration::from_secs(10));
    let started = Instant::now();
    let handle = poller.await_artifact(&path).await.unwrap();

    assert_eq!(handle.path(), path);
    assert!(started.elapsed() < Duration::from_secs(1));
  }

  #[tokio::test]
  async fn test_file_appearing_late_is_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("late.report.json");

    let writer_path = path.clone();
    let writer = tokio::spawn(async move {
      tokio::time::sleep(Duration::from_millis(30)).await;
      fs::write(&writer_path, "{}").await.unwrap();
    });

    let poller = ArtifactPoller::new(50, Duration::from_millis(10));
    let handle = poller.await_artifact(&path).await.unwrap();
    writer.await.unwrap();

    assert_eq!(handle.into_path(), path);
  }

  #[tokio::test]
  async fn test_missing_file_exhausts_budget() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("never.json");

    let poller = ArtifactPoller::new(3, Duration::from_millis(5));
    let err = poller.await_artifact(&path).await.unwrap_err();

    match err {
      ArtifactError::NotFound { path: p, attempts } => {
        assert_eq!(p, path);
        assert_eq!(attempts, 3);
      }
      other => panic!("expected NotFound, got {:?}", other),
    }
  }

  #[tokio::test]
  async fn test_directory_is_not_an_artifact() {
    let dir = tempfile::tempdir().unwrap();

    let poller = ArtifactPoller::new(1, Duration::from_millis(1));
    assert!(poller.await_artifact(dir.path()).await.is_err());
  }

  #[test]
  fn test_zero_attempts_clamped() {
    assert_eq!(ArtifactPoller::new(0, Duration::ZERO).attempts, 1);
  }
}
