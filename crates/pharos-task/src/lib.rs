//! Audit tasks and the invocations derived from them.
//!
//! A run starts from a list of URLs and a [`PresetMode`](pharos_config::PresetMode).
//! [`expand_tasks`] turns them into an ordered list of [`AuditTask`]s, and
//! [`CommandBuilder`] turns each task into the [`ProcessInvocation`] the
//! executor runs. Building an invocation is pure: the only time input is the
//! [`Stamp`] captured by the caller through a [`Clock`].

mod command;
mod naming;
mod types;

pub use command::{CommandBuilder, ExpectedArtifact, ProcessInvocation};
pub use naming::{Clock, FixedClock, Stamp, SystemClock, run_dir, sanitize_url};
pub use types::{AuditTask, expand_tasks};
