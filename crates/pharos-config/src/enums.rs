use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Device profile the audit tool simulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
  Desktop,
  Mobile,
}

impl Preset {
  pub fn as_str(&self) -> &'static str {
    match self {
      Preset::Desktop => "desktop",
      Preset::Mobile => "mobile",
    }
  }
}

impl fmt::Display for Preset {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Which presets each URL is audited with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetMode {
  Desktop,
  Mobile,
  #[default]
  Both,
}

impl PresetMode {
  /// Presets in execution order. `Both` always yields desktop before mobile.
  pub fn presets(&self) -> &'static [Preset] {
    match self {
      PresetMode::Desktop => &[Preset::Desktop],
      PresetMode::Mobile => &[Preset::Mobile],
      PresetMode::Both => &[Preset::Desktop, Preset::Mobile],
    }
  }

  /// Whether more than one preset runs per URL.
  pub fn is_dual(&self) -> bool {
    matches!(self, PresetMode::Both)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      PresetMode::Desktop => "desktop",
      PresetMode::Mobile => "mobile",
      PresetMode::Both => "both",
    }
  }
}

impl fmt::Display for PresetMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for PresetMode {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "desktop" => Ok(PresetMode::Desktop),
      "mobile" => Ok(PresetMode::Mobile),
      "both" => Ok(PresetMode::Both),
      other => Err(ConfigError::Invalid(format!(
        "unknown preset mode '{}' (expected desktop, mobile or both)",
        other
      ))),
    }
  }
}

/// Report format the audit tool is asked to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
  Json,
  Html,
  Csv,
}

impl OutputFormat {
  /// Name as passed to `--output=` and used as the file extension.
  pub fn as_str(&self) -> &'static str {
    match self {
      OutputFormat::Json => "json",
      OutputFormat::Html => "html",
      OutputFormat::Csv => "csv",
    }
  }
}

impl fmt::Display for OutputFormat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_both_runs_desktop_first() {
    assert_eq!(
      PresetMode::Both.presets(),
      &[Preset::Desktop, Preset::Mobile]
    );
    assert!(PresetMode::Both.is_dual());
    assert!(!PresetMode::Mobile.is_dual());
  }

  #[test]
  fn test_preset_mode_from_str() {
    assert_eq!("Desktop".parse::<PresetMode>().unwrap(), PresetMode::Desktop);
    assert_eq!(" both ".parse::<PresetMode>().unwrap(), PresetMode::Both);
    assert!("tablet".parse::<PresetMode>().is_err());
  }

  #[test]
  fn test_serde_names() {
    let mode: PresetMode = serde_json::from_str("\"mobile\"").unwrap();
    assert_eq!(mode, PresetMode::Mobile);
    assert_eq!(serde_json::to_string(&OutputFormat::Html).unwrap(), "\"html\"");
  }
}
