//! Audit process execution for pharos.
//!
//! This crate provides the [`AuditExecutor`] seam and [`ProcessExecutor`],
//! which spawns the external audit tool and resolves once it exits. It only
//! observes the exit status; the report the tool writes to disk is picked up
//! separately by the artifact poller.

mod error;
mod executor;
mod outcome;

pub use error::ExecutorError;
pub use executor::{AuditExecutor, ProcessExecutor};
pub use outcome::ExitOutcome;
