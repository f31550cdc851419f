//! Implementation of the `idconverge plan` command.
//!
//! Walks the recipe in dry-run mode: guards are evaluated against the live
//! system but nothing is written and no command runs.

use std::path::Path;

use anyhow::Result;

use super::{converge, load_node_file};
use crate::RunArgs;
use crate::output::{OutputFormat, print_info, print_json, print_resources, print_summary};

pub fn cmd_plan(node_path: &Path, run: &RunArgs, verbose: bool, output: OutputFormat) -> Result<()> {
  let node_file = load_node_file(node_path)?;

  let report = converge(&node_file, run, true)?;

  if output.is_json() {
    return print_json(&report);
  }

  if !report.is_changed() {
    print_info("No changes would be made");
    return Ok(());
  }

  print_resources(&report, verbose);
  println!();
  print_info(&format!("Would change {} resource(s)", report.updated_count()));
  print_summary(&report);

  Ok(())
}
