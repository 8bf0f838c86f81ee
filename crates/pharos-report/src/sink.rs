use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use pharos_artifact::ScoreSet;
use pharos_task::AuditTask;
use tokio::fs::{self, File};
use tokio::io::{AsyncWrite, AsyncWriteExt, DuplexStream};
use tracing::{debug, info};

use crate::layout::ReportLayout;

/// Error type for the aggregate report. Any of these ends the run.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
  #[error("failed to open report {path}: {source}")]
  Open {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to write report {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to close report {path}: {source}")]
  Close {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// A byte destination the sink can make durable on close.
#[async_trait]
pub trait SinkWriter: AsyncWrite + Unpin + Send {
  /// Push written data to durable storage.
  async fn sync(&mut self) -> io::Result<()> {
    Ok(())
  }
}

#[async_trait]
impl SinkWriter for File {
  async fn sync(&mut self) -> io::Result<()> {
    self.sync_all().await
  }
}

#[async_trait]
impl SinkWriter for DuplexStream {}

/// What a closed sink produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkSummary {
  pub location: PathBuf,
  pub rows: usize,
}

/// Append-only CSV report, owned for the duration of one run.
pub struct CsvSink<W = File> {
  writer: W,
  location: PathBuf,
  layout: ReportLayout,
  rows: usize,
}

impl CsvSink<File> {
  /// Create the report file (and its parent directories) and write the header.
  pub async fn open(path: impl Into<PathBuf>, layout: ReportLayout) -> Result<Self, SinkError> {
    let path = path.into();
    let open_err = |source| SinkError::Open {
      path: path.clone(),
      source,
    };

    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
    {
      fs::create_dir_all(parent).await.map_err(open_err)?;
    }
    let file = File::create(&path).await.map_err(open_err)?;

    info!(path = %path.display(), "report opened");
    Self::from_writer(file, path, layout).await
  }
}

impl<W: SinkWriter> CsvSink<W> {
  /// Wrap an already open writer and write the header to it.
  pub async fn from_writer(
    writer: W,
    location: impl Into<PathBuf>,
    layout: ReportLayout,
  ) -> Result<Self, SinkError> {
    let mut sink = Self {
      writer,
      location: location.into(),
      layout,
      rows: 0,
    };
    let header = sink.layout.header_line();
    sink.write_line(&header).await?;
    Ok(sink)
  }

  pub fn location(&self) -> &Path {
    &self.location
  }

  /// Append the row for one successful task.
  ///
  /// The row goes out in a single write and is flushed before returning.
  pub async fn append(&mut self, task: &AuditTask, scores: &ScoreSet) -> Result<(), SinkError> {
    let line = self.layout.row_line(task, scores);
    self.write_line(&line).await?;
    self.rows += 1;
    debug!(url = %task.url, preset = %task.preset, rows = self.rows, "report row appended");
    Ok(())
  }

  /// Flush and sync the report. Consumes the sink, so it cannot be written
  /// to or closed again.
  pub async fn close(mut self) -> Result<SinkSummary, SinkError> {
    let close_err = |source| SinkError::Close {
      path: self.location.clone(),
      source,
    };

    self.writer.flush().await.map_err(close_err)?;
    self.writer.sync().await.map_err(close_err)?;
    self.writer.shutdown().await.map_err(close_err)?;

    info!(path = %self.location.display(), rows = self.rows, "report closed");
    Ok(SinkSummary {
      location: self.location,
      rows: self.rows,
    })
  }

  async fn write_line(&mut self, line: &str) -> Result<(), SinkError> {
    let write_err = |source| SinkError::Write {
      path: self.location.clone(),
      source,
    };
    self.writer.write_all(line.as_bytes()).await.map_err(write_err)?;
    self.writer.flush().await.map_err(write_err)
  }
}

#[cfg(test)]
mod tests {
  use pharos_config::{Preset, PresetMode};

  use super::*;

  fn scores(performance: u8) -> ScoreSet {
    ScoreSet {
      performance,
      accessibility: 90,
      best_practices: 80,
      seo: 70,
    }
  }

  #[tokio::test]
  async fn test_rows_stream_to_disk_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/2024-03-09/summary.csv");

    let mut sink = CsvSink::open(&path, ReportLayout::for_mode(PresetMode::Both))
      .await
      .unwrap();
    sink
      .append(&AuditTask::new("https://a.test", Preset::Desktop), &scores(91))
      .await
      .unwrap();

    // Rows are visible before close.
    let partial = fs::read_to_string(&path).await.unwrap();
    assert_eq!(partial.lines().count(), 2);

    sink
      .append(&AuditTask::new("https://a.test", Preset::Mobile), &scores(64))
      .await
      .unwrap();
    let summary = sink.close().await.unwrap();

    assert_eq!(summary.rows, 2);
    assert_eq!(summary.location, path);
    let content = fs::read_to_string(&path).await.unwrap();
    assert_eq!(
      content,
      "URL,Preset,Performance,Accessibility,Best Practices,SEO\n\
       https://a.test,desktop,91,90,80,70\n\
       https://a.test,mobile,64,90,80,70\n"
    );
  }

  #[tokio::test]
  async fn test_empty_run_leaves_header_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("summary.csv");

    let sink = CsvSink::open(&path, ReportLayout::for_mode(PresetMode::Mobile))
      .await
      .unwrap();
    let summary = sink.close().await.unwrap();

    assert_eq!(summary.rows, 0);
    assert_eq!(
      fs::read_to_string(&path).await.unwrap(),
      "URL,Performance,Accessibility,Best Practices,SEO\n"
    );
  }

  #[tokio::test]
  async fn test_write_failure_is_reported() {
    let (writer, reader) = tokio::io::duplex(1024);
    let mut sink = CsvSink::from_writer(writer, "memory.csv", ReportLayout::for_mode(PresetMode::Both))
      .await
      .unwrap();
    drop(reader);

    let err = sink
      .append(&AuditTask::new("https://a.test", Preset::Desktop), &scores(50))
      .await
      .unwrap_err();

    assert!(matches!(err, SinkError::Write { .. }));
    assert_eq!(sink.rows, 0);
  }

  #[tokio::test]
  async fn test_open_fails_when_parent_is_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "").await.unwrap();

    let err = CsvSink::open(blocker.join("summary.csv"), ReportLayout::for_mode(PresetMode::Both))
      .await
      .err()
      .unwrap();
    assert!(matches!(err, SinkError::Open { .. }));
  }
}
