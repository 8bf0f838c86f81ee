//! Pharos Report
//!
//! The aggregate report is a CSV file with one row per successfully audited
//! task. [`CsvSink`] owns the file for the whole run: it is opened once before
//! the first task, receives rows as tasks complete, and is closed once after
//! the last one. Rows are written and flushed one at a time, so a run that is
//! interrupted still leaves every completed row on disk.

mod layout;
mod sink;

pub use layout::{ReportLayout, escape_field, report_path};
pub use sink::{CsvSink, SinkError, SinkSummary, SinkWriter};
