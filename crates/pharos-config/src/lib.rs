//! Pharos Config
//!
//! This crate contains the serializable run configuration for pharos. A run
//! configuration says which URLs to audit, with which device presets, how the
//! external audit tool is invoked and where the aggregate report is written.
//!
//! Configuration can be loaded from:
//! - JSON files (via CLI with `--config=pharos.json`)
//! - Defaults, overridden field by field from CLI flags
//!
//! Every field has a default, so an empty JSON object is a valid config.

mod enums;
mod error;
mod run;

pub use enums::{OutputFormat, Preset, PresetMode};
pub use error::ConfigError;
pub use run::{PollConfig, RunConfig, ToolConfig};
