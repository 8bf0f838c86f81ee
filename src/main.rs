use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use pharos_artifact::ArtifactPoller;
use pharos_config::{PresetMode, RunConfig};
use pharos_executor::ProcessExecutor;
use pharos_orchestrator::{Orchestrator, RunSummary};
use pharos_report::{CsvSink, ReportLayout, report_path};
use pharos_task::{Clock, CommandBuilder, SystemClock, expand_tasks, run_dir};

mod urls;

/// Pharos - batch page-quality audits with a single CSV summary
#[derive(Parser)]
#[command(name = "pharos")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Log debug output
  #[arg(long, short, global = true)]
  verbose: bool,

  /// Only log errors
  #[arg(long, short, global = true, conflicts_with = "verbose")]
  quiet: bool,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Audit every URL and write the summary report
  Run(RunArgs),

  /// Print the tasks and tool invocations a run would execute
  Tasks(RunArgs),

  /// Print the effective configuration as JSON
  Config(RunArgs),
}

#[derive(Args)]
struct RunArgs {
  /// Path to a JSON run configuration
  #[arg(long)]
  config: Option<PathBuf>,

  /// File with one URL per line
  #[arg(long)]
  urls: Option<PathBuf>,

  /// Directory for reports (default: lighthouse-reports)
  #[arg(long)]
  output_root: Option<PathBuf>,

  /// Presets to audit each URL with: desktop, mobile or both
  #[arg(long)]
  preset: Option<PresetMode>,

  /// Base name of the summary report
  #[arg(long)]
  report_name: Option<String>,

  /// Audit tool command
  #[arg(long)]
  tool: Option<String>,
}

impl RunArgs {
  fn load_config(&self) -> Result<RunConfig> {
    let mut config = match &self.config {
      Some(path) => RunConfig::from_file(path)?,
      None => RunConfig::default(),
    };

    if let Some(urls) = &self.urls {
      config.urls_file = urls.clone();
    }
    if let Some(root) = &self.output_root {
      config.output_root = root.clone();
    }
    if let Some(mode) = self.preset {
      config.preset_mode = mode;
    }
    if let Some(name) = &self.report_name {
      config.report_name = name.clone();
    }
    if let Some(tool) = &self.tool {
      config.tool.command = tool.clone();
    }

    config.validate()?;
    Ok(config)
  }
}

/// Exit status after a forced stop, as a shell reports death by SIGINT.
const INTERRUPTED_EXIT: u8 = 130;

/// How `run` ended.
enum RunOutcome {
  Finished(RunSummary),
  /// A second interrupt dropped the audit in flight.
  Interrupted,
}

fn main() -> Result<ExitCode> {
  let cli = Cli::parse();
  init_tracing(cli.quiet, cli.verbose)?;

  match cli.command {
    Some(Commands::Run(args)) => {
      let config = args.load_config()?;
      match run_audits(config)? {
        RunOutcome::Finished(summary) => print_summary(&summary),
        RunOutcome::Interrupted => {
          eprintln!("Run stopped, the audit in progress was killed");
          return Ok(ExitCode::from(INTERRUPTED_EXIT));
        }
      }
    }
    Some(Commands::Tasks(args)) => {
      let config = args.load_config()?;
      let urls = urls::read_urls(&config.urls_file)?;
      for line in describe_tasks(&config, urls, &SystemClock) {
        println!("{}", line);
      }
    }
    Some(Commands::Config(args)) => {
      let config = args.load_config()?;
      println!("{}", serde_json::to_string_pretty(&config)?);
    }
    None => {
      println!("pharos - use --help to see available commands");
    }
  }

  Ok(ExitCode::SUCCESS)
}

fn init_tracing(quiet: bool, verbose: bool) -> Result<()> {
  let level = if quiet {
    "error"
  } else if verbose {
    "debug"
  } else {
    "info"
  };

  let filter = tracing_subscriber::EnvFilter::try_from_env("PHAROS_LOG")
    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .try_init()
    .map_err(|e| anyhow::anyhow!("failed to initialize tracing subscriber: {}", e))?;

  Ok(())
}

fn run_audits(config: RunConfig) -> Result<RunOutcome> {
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { run_audits_async(config).await })
}

async fn run_audits_async(config: RunConfig) -> Result<RunOutcome> {
  let urls = urls::read_urls(&config.urls_file)?;
  if urls.is_empty() {
    warn!(path = %config.urls_file.display(), "URL list is empty");
  }

  // Every path of the run derives from this one stamp.
  let run_stamp = SystemClock.now();
  let artifact_dir = run_dir(&config.output_root, &run_stamp);
  tokio::fs::create_dir_all(&artifact_dir)
    .await
    .with_context(|| format!("failed to create output directory: {}", artifact_dir.display()))?;

  let tasks = expand_tasks(urls, config.preset_mode);
  info!(tasks = tasks.len(), preset_mode = %config.preset_mode, "tasks expanded");

  let sink = CsvSink::open(
    report_path(
      &config.output_root,
      &config.report_name,
      config.preset_mode,
      &run_stamp,
    ),
    ReportLayout::for_mode(config.preset_mode),
  )
  .await
  .context("failed to open summary report")?;

  let orchestrator = Orchestrator::new(
    ProcessExecutor::new(),
    CommandBuilder::new(config.tool.clone(), artifact_dir),
    ArtifactPoller::new(config.poll.attempts, config.poll.interval()),
  );

  let cancel = CancellationToken::new();
  let force_stop = CancellationToken::new();
  tokio::spawn(watch_interrupts(cancel.clone(), force_stop.clone()));

  // Dropping the run future drops the executing child, which kills it.
  tokio::select! {
    result = orchestrator.run(tasks, sink, cancel) => {
      let summary = result.context("audit run aborted")?;
      Ok(RunOutcome::Finished(summary))
    }
    _ = force_stop.cancelled() => Ok(RunOutcome::Interrupted),
  }
}

/// First Ctrl-C stops the run after the current audit, the second stops it
/// immediately.
async fn watch_interrupts(cancel: CancellationToken, force_stop: CancellationToken) {
  while tokio::signal::ctrl_c().await.is_ok() {
    escalate(&cancel, &force_stop);
    if force_stop.is_cancelled() {
      return;
    }
  }
}

fn escalate(cancel: &CancellationToken, force_stop: &CancellationToken) {
  if cancel.is_cancelled() {
    warn!("second interrupt received, stopping the current audit");
    force_stop.cancel();
  } else {
    warn!("interrupt received, finishing the current audit before stopping (Ctrl-C again to stop now)");
    cancel.cancel();
  }
}

fn print_summary(summary: &RunSummary) {
  eprintln!(
    "Audited {} of {} task(s): {} succeeded, {} failed",
    summary.total - summary.skipped,
    summary.total,
    summary.succeeded,
    summary.failed.len()
  );
  for result in &summary.failed {
    if let Some(failure) = result.failure() {
      eprintln!("  {} ({}): {}", result.task.url, result.task.preset, failure);
    }
  }
  if summary.was_cancelled() {
    eprintln!("Run interrupted, {} task(s) not started", summary.skipped);
  }
  println!("Report saved to {}", summary.report_path.display());
}

/// Dry-run listing: each task with its tool command line, then the report
/// path a run would write.
fn describe_tasks(config: &RunConfig, urls: Vec<String>, clock: &dyn Clock) -> Vec<String> {
  let run_stamp = clock.now();
  let builder = CommandBuilder::new(
    config.tool.clone(),
    run_dir(&config.output_root, &run_stamp),
  );

  let mut lines = Vec::new();
  for (index, task) in expand_tasks(urls, config.preset_mode).iter().enumerate() {
    let invocation = builder.build(task, &clock.now());
    lines.push(format!("{:>3}. {} ({})", index + 1, task.url, task.preset));
    lines.push(format!("     {}", invocation));
    if invocation.artifact.is_renamed() {
      lines.push(format!(
        "     reads {}",
        invocation.artifact.expected.display()
      ));
    }
  }
  lines.push(format!(
    "Report: {}",
    report_path(
      &config.output_root,
      &config.report_name,
      config.preset_mode,
      &run_stamp
    )
    .display()
  ));
  lines
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use pharos_config::OutputFormat;

  use super::*;

  fn parse_run_args(args: &[&str]) -> RunArgs {
    let cli = Cli::try_parse_from(std::iter::once("pharos").chain(args.iter().copied())).unwrap();
    match cli.command {
      Some(Commands::Run(args)) => args,
      _ => panic!("expected the run command"),
    }
  }

  fn config_file(json: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", json).unwrap();
    file
  }

  #[test]
  fn test_flags_override_config_file() {
    let file = config_file(
      r#"{"preset_mode": "desktop", "report_name": "nightly", "tool": {"command": "/opt/lighthouse"}}"#,
    );
    let path = file.path().to_str().unwrap();

    let config = parse_run_args(&["run", "--config", path, "--preset", "mobile", "--tool", "fake-lh"])
      .load_config()
      .unwrap();

    assert_eq!(config.preset_mode, PresetMode::Mobile);
    assert_eq!(config.tool.command, "fake-lh");
    assert_eq!(config.report_name, "nightly");
  }

  #[test]
  fn test_override_can_repair_config_file() {
    let file = config_file(r#"{"tool": {"command": ""}}"#);
    let path = file.path().to_str().unwrap();

    let config = parse_run_args(&["run", "--config", path, "--tool", "lighthouse"])
      .load_config()
      .unwrap();
    assert_eq!(config.tool.command, "lighthouse");
  }

  #[test]
  fn test_invalid_override_is_rejected() {
    let file = config_file(r#"{"tool": {"command": "lighthouse"}}"#);
    let path = file.path().to_str().unwrap();

    let err = parse_run_args(&["run", "--config", path, "--tool", ""])
      .load_config()
      .unwrap_err();
    assert!(err.to_string().contains("tool.command"));
  }

  #[test]
  fn test_second_interrupt_forces_stop() {
    let cancel = CancellationToken::new();
    let force_stop = CancellationToken::new();

    escalate(&cancel, &force_stop);
    assert!(cancel.is_cancelled());
    assert!(!force_stop.is_cancelled());

    escalate(&cancel, &force_stop);
    assert!(force_stop.is_cancelled());
  }

  #[test]
  fn test_describe_tasks_lists_every_invocation() {
    let mut config = RunConfig::default();
    config.output_root = PathBuf::from("out");

    let lines = describe_tasks(
      &config,
      vec!["https://a.test".to_string(), "https://b.test".to_string()],
      &SystemClock,
    );

    // Two presets per URL, each with command and renamed-report lines.
    assert_eq!(lines.len(), 4 * 3 + 1);
    assert_eq!(lines[0], "  1. https://a.test (desktop)");
    assert!(lines[1].starts_with("     lighthouse https://a.test --output=json,html"));
    assert!(lines[1].contains("--preset=desktop"));
    assert!(lines[2].ends_with(".report.json"));
    assert_eq!(lines[3], "  2. https://a.test (mobile)");
    assert!(!lines[4].contains("--preset="));
    assert_eq!(lines[9], "  4. https://b.test (mobile)");

    let report = &lines[12];
    assert!(report.starts_with("Report: out"));
    assert!(report.contains("lighthouse-summary-both-"));
    assert!(report.ends_with(".csv"));
  }

  #[test]
  fn test_describe_tasks_single_format_reads_requested_path() {
    let mut config = RunConfig::default();
    config.preset_mode = PresetMode::Desktop;
    config.tool.output_formats = vec![OutputFormat::Json];

    let lines = describe_tasks(&config, vec!["https://a.test".to_string()], &SystemClock);

    assert_eq!(lines.len(), 3);
    assert!(lines[1].contains(".json"));
    assert!(lines[2].starts_with("Report: "));
  }
}
