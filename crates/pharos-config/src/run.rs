use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::enums::{OutputFormat, PresetMode};
use crate::error::ConfigError;

/// Complete configuration of one audit run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
  /// Newline-delimited list of URLs to audit.
  pub urls_file: PathBuf,
  /// Root directory for per-task artifacts and the aggregate report.
  pub output_root: PathBuf,
  /// Base name of the aggregate report file.
  pub report_name: String,
  pub preset_mode: PresetMode,
  pub tool: ToolConfig,
  pub poll: PollConfig,
}

impl Default for RunConfig {
  fn default() -> Self {
    Self {
      urls_file: PathBuf::from("urls.txt"),
      output_root: PathBuf::from("lighthouse-reports"),
      report_name: "lighthouse-summary".to_string(),
      preset_mode: PresetMode::default(),
      tool: ToolConfig::default(),
      poll: PollConfig::default(),
    }
  }
}

/// How the external audit tool is invoked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
  /// Program name or path, resolved through `PATH`.
  pub command: String,
  /// Formats requested from the tool. Must contain `json`.
  pub output_formats: Vec<OutputFormat>,
  /// Flags forwarded to the browser, joined into `--chrome-flags`.
  pub chrome_flags: Vec<String>,
  /// Appended verbatim after the generated arguments.
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub extra_args: Vec<String>,
}

impl Default for ToolConfig {
  fn default() -> Self {
    Self {
      command: "lighthouse".to_string(),
      output_formats: vec![OutputFormat::Json, OutputFormat::Html],
      chrome_flags: vec![
        "--ignore-certificate-errors".to_string(),
        "--headless".to_string(),
      ],
      extra_args: Vec::new(),
    }
  }
}

/// Bounded existence poll for the artifact written by the tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
  pub attempts: u32,
  pub interval_ms: u64,
}

impl PollConfig {
  pub fn interval(&self) -> Duration {
    Duration::from_millis(self.interval_ms)
  }
}

impl Default for PollConfig {
  fn default() -> Self {
    Self {
      attempts: 5,
      interval_ms: 1000,
    }
  }
}

impl RunConfig {
  /// Load a config from a JSON file. Missing fields take their defaults.
  ///
  /// Not validated here: callers apply overrides first, then call
  /// [`RunConfig::validate`].
  pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let config: RunConfig =
      serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
      })?;
    Ok(config)
  }

  /// Reject configurations the pipeline cannot run with.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.tool.command.trim().is_empty() {
      return Err(ConfigError::Invalid("tool.command must not be empty".to_string()));
    }
    if !self.tool.output_formats.contains(&OutputFormat::Json) {
      return Err(ConfigError::Invalid(
        "tool.output_formats must include json, scores are read from the json report".to_string(),
      ));
    }
    if self.poll.attempts == 0 {
      return Err(ConfigError::Invalid("poll.attempts must be at least 1".to_string()));
    }
    if self.report_name.trim().is_empty() {
      return Err(ConfigError::Invalid("report_name must not be empty".to_string()));
    }
    Ok(())
  }
}
