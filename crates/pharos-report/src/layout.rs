use std::path::{Path, PathBuf};

use pharos_artifact::{Category, ScoreSet};
use pharos_config::PresetMode;
use pharos_task::{AuditTask, Stamp, run_dir};

/// Column layout of the aggregate report.
///
/// The `Preset` column only appears when each URL runs with both presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportLayout {
  with_preset: bool,
}

impl ReportLayout {
  pub fn for_mode(mode: PresetMode) -> Self {
    Self {
      with_preset: mode.is_dual(),
    }
  }

  pub fn columns(&self) -> Vec<&'static str> {
    let mut columns = vec!["URL"];
    if self.with_preset {
      columns.push("Preset");
    }
    columns.extend(Category::ALL.iter().map(Category::label));
    columns
  }

  pub fn header_line(&self) -> String {
    let mut line = self
      .columns()
      .iter()
      .map(|c| escape_field(c))
      .collect::<Vec<_>>()
      .join(",");
    line.push('\n');
    line
  }

  pub fn row_line(&self, task: &AuditTask, scores: &ScoreSet) -> String {
    let mut fields = vec![escape_field(&task.url)];
    if self.with_preset {
      fields.push(task.preset.to_string());
    }
    fields.extend(scores.values().iter().map(u8::to_string));
    let mut line = fields.join(",");
    line.push('\n');
    line
  }
}

/// Location of the aggregate report:
/// `<output-root>/<run-date>/<report-name>-<preset-mode>-<run-timestamp>.csv`.
pub fn report_path(
  output_root: &Path,
  report_name: &str,
  mode: PresetMode,
  run_stamp: &Stamp,
) -> PathBuf {
  run_dir(output_root, run_stamp).join(format!(
    "{}-{}-{}.csv",
    report_name,
    mode,
    run_stamp.run_timestamp()
  ))
}

/// Escape a value for CSV: wrap in quotes if it contains a comma, quote or
/// line break.
pub fn escape_field(value: &str) -> String {
  if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
    format!("\"{}\"", value.replace('"', "\"\""))
  } else {
    value.to_string()
  }
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};
  use pharos_config::Preset;

  use super::*;

  fn scores() -> ScoreSet {
    ScoreSet {
      performance: 93,
      accessibility: 100,
      best_practices: 79,
      seo: 88,
    }
  }

  #[test]
  fn test_dual_layout_has_preset_column() {
    let layout = ReportLayout::for_mode(PresetMode::Both);
    assert_eq!(
      layout.header_line(),
      "URL,Preset,Performance,Accessibility,Best Practices,SEO\n"
    );
    assert_eq!(
      layout.row_line(&AuditTask::new("https://a.test", Preset::Mobile), &scores()),
      "https://a.test,mobile,93,100,79,88\n"
    );
  }

  #[test]
  fn test_single_layout_omits_preset_column() {
    let layout = ReportLayout::for_mode(PresetMode::Desktop);
    assert_eq!(
      layout.header_line(),
      "URL,Performance,Accessibility,Best Practices,SEO\n"
    );
    assert_eq!(
      layout.row_line(&AuditTask::new("https://a.test", Preset::Desktop), &scores()),
      "https://a.test,93,100,79,88\n"
    );
  }

  #[test]
  fn test_escape_field() {
    assert_eq!(escape_field("plain"), "plain");
    assert_eq!(escape_field("https://a.test/?a=1,2"), "\"https://a.test/?a=1,2\"");
    assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
  }

  #[test]
  fn test_report_path() {
    let stamp = Stamp::new(Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 58).unwrap());
    let path = report_path(Path::new("reports"), "summary", PresetMode::Both, &stamp);
    assert_eq!(
      path,
      PathBuf::from("reports/2024-12-31/summary-both-20241231T235958.csv")
    );
  }
}
