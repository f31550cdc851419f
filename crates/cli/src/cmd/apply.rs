//! Implementation of the `idconverge apply` command.
//!
//! Builds the identity recipe from a node file and converges the node. With
//! `--publish`, generated PKI material is written back into the node file so
//! other nodes can pick it up.

use std::path::Path;

use anyhow::{Context, Result};
use idconverge_lib::recipe::publish_pki;
use tracing::info;

use super::{converge, layout, load_node_file};
use crate::RunArgs;
use crate::output::{OutputFormat, print_info, print_json, print_resources, print_success, print_summary};

/// Execute the apply command.
///
/// Prints each changed or skipped resource followed by the run counts.
pub fn cmd_apply(
  node_path: &Path,
  run: &RunArgs,
  publish: bool,
  verbose: bool,
  output: OutputFormat,
) -> Result<()> {
  let mut node_file = load_node_file(node_path)?;

  let report = converge(&node_file, run, false)?;

  let published = if publish {
    let keys = publish_pki(&node_file.node, &layout(&run.target), &mut node_file.topology)
      .context("Failed to publish PKI material")?;
    if !keys.is_empty() {
      node_file
        .save(node_path)
        .with_context(|| format!("Failed to update node file: {}", node_path.display()))?;
    }
    keys
  } else {
    Vec::new()
  };

  info!(updated = report.updated_count(), published = published.len(), "apply finished");

  if output.is_json() {
    return print_json(&serde_json::json!({ "report": report, "published": published }));
  }

  print_resources(&report, verbose);
  println!();
  print_success("Apply complete!");
  print_summary(&report);
  if !published.is_empty() {
    print_info(&format!(
      "Published PKI material ({}) to {}",
      published.join(", "),
      node_path.display()
    ));
  }

  Ok(())
}
