//! Building the audit tool invocation for one task.

use std::fmt;
use std::path::PathBuf;

use pharos_config::{OutputFormat, Preset, ToolConfig};

use crate::naming::{Stamp, sanitize_url};
use crate::types::AuditTask;

/// The program, arguments and expected artifact for one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInvocation {
  pub program: String,
  pub args: Vec<String>,
  /// `--output-path` value and where the JSON report is expected once the
  /// tool has exited.
  pub artifact: ExpectedArtifact,
}

/// Requested and expected locations of the JSON report.
///
/// The tool writes to the requested path when a single format is asked for.
/// With several formats it drops the extension and writes
/// `<path>.report.<format>` for each of them instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedArtifact {
  pub requested: PathBuf,
  pub expected: PathBuf,
}

impl ExpectedArtifact {
  /// Whether the tool is expected to rename its output.
  pub fn is_renamed(&self) -> bool {
    self.requested != self.expected
  }
}

impl fmt::Display for ProcessInvocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.program)?;
    for arg in &self.args {
      if arg.contains(' ') {
        write!(f, " '{}'", arg)?;
      } else {
        write!(f, " {}", arg)?;
      }
    }
    Ok(())
  }
}

/// Builds [`ProcessInvocation`]s from run-wide tool settings.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
  tool: ToolConfig,
  artifact_dir: PathBuf,
}

impl CommandBuilder {
  /// `tool.output_formats` must contain [`OutputFormat::Json`]; see
  /// `RunConfig::validate`.
  pub fn new(tool: ToolConfig, artifact_dir: impl Into<PathBuf>) -> Self {
    Self {
      tool,
      artifact_dir: artifact_dir.into(),
    }
  }

  /// Build the invocation for `task`, naming its output with `stamp`.
  pub fn build(&self, task: &AuditTask, stamp: &Stamp) -> ProcessInvocation {
    let stem = format!(
      "report-{}-{}-{}",
      sanitize_url(&task.url),
      task.preset,
      stamp.task_timestamp()
    );

    let (output_path, expected) = if self.tool.output_formats.len() > 1 {
      let base = self.artifact_dir.join(&stem);
      let expected = self.artifact_dir.join(format!("{}.report.json", stem));
      (base, expected)
    } else {
      let path = self.artifact_dir.join(format!("{}.json", stem));
      (path.clone(), path)
    };

    let formats = self
      .tool
      .output_formats
      .iter()
      .map(OutputFormat::as_str)
      .collect::<Vec<_>>()
      .join(",");

    let mut args = vec![
      task.url.clone(),
      format!("--output={}", formats),
      format!("--output-path={}", output_path.display()),
    ];

    if !self.tool.chrome_flags.is_empty() {
      args.push(format!("--chrome-flags={}", self.tool.chrome_flags.join(" ")));
    }

    // Mobile is the tool's default emulation.
    if task.preset == Preset::Desktop {
      args.push("--preset=desktop".to_string());
    }

    args.extend(self.tool.extra_args.iter().cloned());

    ProcessInvocation {
      program: self.tool.command.clone(),
      args,
      artifact: ExpectedArtifact {
        requested: output_path,
        expected,
      },
    }
  }
}
