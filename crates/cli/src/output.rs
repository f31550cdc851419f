//! CLI output formatting utilities.
//!
//! Provides consistent formatting for terminal output: colored status
//! messages, the per-resource run report and duration formatting.

use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use idconverge_lib::execute::{Outcome, ResourceReport, RunReport};
use owo_colors::{OwoColorize, Stream};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const INFO: &str = "•";
  pub const ARROW: &str = "→";
  pub const MODIFY: &str = "~";
  pub const SKIP: &str = "-";
}

pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  let millis = duration.subsec_millis();

  if secs >= 60 {
    let mins = secs / 60;
    let remaining_secs = secs % 60;
    format!("{}m {}s", mins, remaining_secs)
  } else if secs > 0 {
    format!("{}.{:02}s", secs, millis / 10)
  } else {
    format!("{}ms", millis)
  }
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}

/// One line per resource; up-to-date resources only in verbose mode.
pub fn print_resources(report: &RunReport, verbose: bool) {
  for entry in &report.resources {
    if entry.outcome == Outcome::UpToDate && !verbose {
      continue;
    }
    println!("{}", resource_line(entry));
    if verbose && let Outcome::Updated { changes } = &entry.outcome {
      for change in changes {
        println!("      {}", change.if_supports_color(Stream::Stdout, |s| s.dimmed()));
      }
    }
  }
}

fn resource_line(entry: &ResourceReport) -> String {
  let id = entry.id();
  let trigger = match &entry.notified_by {
    Some(by) => format!(" ({} {})", symbols::ARROW, by),
    None => String::new(),
  };

  match &entry.outcome {
    Outcome::Updated { .. } => format!(
      "  {} {}{}",
      symbols::MODIFY.if_supports_color(Stream::Stdout, |s| s.yellow()),
      id,
      trigger
    ),
    Outcome::UpToDate => format!(
      "  {} {}{}",
      symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
      id,
      trigger
    ),
    Outcome::Skipped { reason } => format!(
      "  {} {}{} {}",
      symbols::SKIP.if_supports_color(Stream::Stdout, |s| s.dimmed()),
      id,
      trigger,
      format!("(skipped: {})", reason).if_supports_color(Stream::Stdout, |s| s.dimmed())
    ),
  }
}

/// Counts and elapsed time of a run.
pub fn print_summary(report: &RunReport) {
  print_stat("Updated", &report.updated_count().to_string());
  print_stat("Up to date", &report.up_to_date_count().to_string());
  print_stat("Skipped", &report.skipped_count().to_string());
  print_stat("Elapsed", &format_duration(report.elapsed));
}
