use pharos_config::{Preset, PresetMode};
use serde::{Deserialize, Serialize};

/// One (URL, preset) unit of audit work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTask {
  pub url: String,
  pub preset: Preset,
}

impl AuditTask {
  pub fn new(url: impl Into<String>, preset: Preset) -> Self {
    Self {
      url: url.into(),
      preset,
    }
  }
}

/// Expand URLs into tasks in execution order.
///
/// Tasks for the same URL are adjacent; with [`PresetMode::Both`] desktop
/// comes before mobile.
pub fn expand_tasks<I, S>(urls: I, mode: PresetMode) -> Vec<AuditTask>
where
  I: IntoIterator<Item = S>,
  S: Into<String>,
{
  let presets = mode.presets();
  let mut tasks = Vec::new();
  for url in urls {
    let url = url.into();
    for preset in presets {
      tasks.push(AuditTask::new(url.clone(), *preset));
    }
  }
  tasks
}
