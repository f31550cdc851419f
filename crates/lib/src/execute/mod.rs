//! Resource convergence.
//!
//! This module provides the [`Executor`], which walks an ordered list of
//! resources and brings each one to its desired state. It handles:
//! - Declaration-order execution, one resource at a time
//! - Guard evaluation at the moment a resource is reached
//! - Immediate and delayed notifications between resources
//! - Dry-run reporting without side effects
//!
//! The first failing resource aborts the run. Re-running from the top is the
//! recovery path; every resource kind is safe to apply repeatedly.

pub mod actions;
pub mod attrs;
pub mod types;

use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, error, info};

use crate::resource::{ExecuteAction, Resource, ResourceKind, Timing};
use crate::template::Renderer;

pub use types::{ExecuteConfig, ExecuteError, Outcome, ResourceReport, RunReport};

/// Converges resources using a renderer for template resources.
pub struct Executor<R> {
  renderer: R,
  config: ExecuteConfig,
}

impl<R: Renderer> Executor<R> {
  pub fn new(renderer: R, config: ExecuteConfig) -> Self {
    Self { renderer, config }
  }

  pub fn config(&self) -> &ExecuteConfig {
    &self.config
  }

  /// Run one convergence pass over `resources`.
  ///
  /// Resources are applied exactly once each, in order. Notifications fire
  /// only for resources that report [`Outcome::Updated`]: immediate targets
  /// run right away, delayed targets run once each after the last resource.
  /// Notified runs do not propagate their own notifications.
  ///
  /// # Errors
  ///
  /// Duplicate names and unknown notification targets are rejected before
  /// anything runs. Any action failure aborts the pass; pending delayed
  /// notifications are dropped.
  pub async fn converge(&self, resources: &[Resource]) -> Result<RunReport, ExecuteError> {
    let index = validate(resources)?;
    let start = Instant::now();

    info!(
      resources = resources.len(),
      dry_run = self.config.dry_run,
      "starting convergence"
    );

    let mut report = RunReport {
      dry_run: self.config.dry_run,
      ..RunReport::default()
    };
    let mut delayed: Vec<(usize, &str)> = Vec::new();

    for resource in resources {
      let outcome = self.apply(resource, false).await?;
      let updated = outcome.is_updated();
      report.resources.push(report_entry(resource, outcome, None));

      if !updated {
        continue;
      }

      for notification in &resource.notifies {
        let target_idx = index[notification.target.as_str()];
        match notification.timing {
          Timing::Immediate => {
            let target = &resources[target_idx];
            debug!(from = %resource, to = %target, "immediate notification");
            let outcome = self.apply(target, true).await?;
            report
              .resources
              .push(report_entry(target, outcome, Some(&resource.name)));
          }
          Timing::Delayed => {
            if !delayed.iter().any(|(idx, _)| *idx == target_idx) {
              debug!(from = %resource, to = %resources[target_idx], "queued delayed notification");
              delayed.push((target_idx, resource.name.as_str()));
            }
          }
        }
      }
    }

    for (target_idx, notified_by) in delayed {
      let target = &resources[target_idx];
      debug!(from = notified_by, to = %target, "running delayed notification");
      let outcome = self.apply(target, true).await?;
      report.resources.push(report_entry(target, outcome, Some(notified_by)));
    }

    report.elapsed = start.elapsed();

    info!(
      updated = report.updated_count(),
      up_to_date = report.up_to_date_count(),
      skipped = report.skipped_count(),
      "convergence complete"
    );

    Ok(report)
  }

  /// Apply a single resource, wrapping any failure with the resource id.
  async fn apply(&self, resource: &Resource, notified: bool) -> Result<Outcome, ExecuteError> {
    if let Some(guard) = resource.blocking_guard() {
      debug!(resource = %resource, guard = %guard, "skipped by guard");
      return Ok(Outcome::skipped(guard.to_string()));
    }

    let result = self.apply_kind(&resource.kind, notified).await;

    match result {
      Ok(outcome) => {
        match &outcome {
          Outcome::Updated { changes } => info!(resource = %resource, changes = ?changes, "updated"),
          Outcome::UpToDate => debug!(resource = %resource, "up to date"),
          Outcome::Skipped { reason } => debug!(resource = %resource, reason = %reason, "skipped"),
        }
        Ok(outcome)
      }
      Err(e) => {
        error!(resource = %resource, error = %e, "resource failed");
        Err(ExecuteError::Resource {
          resource: resource.id(),
          source: Box::new(e),
        })
      }
    }
  }

  async fn apply_kind(&self, kind: &ResourceKind, notified: bool) -> Result<Outcome, ExecuteError> {
    let dry_run = self.config.dry_run;

    match kind {
      ResourceKind::Directory(dir) => actions::converge_directory(dir, dry_run).await,
      ResourceKind::File(file) => actions::converge_file(file, dry_run).await,
      ResourceKind::Execute(exec) => {
        if exec.action == ExecuteAction::Nothing && !notified {
          return Ok(Outcome::skipped("action nothing"));
        }
        let change = format!("run `{}`", exec.command);
        if !dry_run {
          actions::execute_cmd(exec, self.config.shell.as_deref(), self.config.timeout).await?;
        }
        Ok(Outcome::from_changes(vec![change]))
      }
      ResourceKind::Template(template) => {
        let rendered = self.renderer.render(&template.source, &template.variables)?;
        actions::write_rendered(&template.path, &rendered, &template.attrs, dry_run).await
      }
    }
  }
}

/// Check names are unique and notification targets exist.
///
/// Returns a name -> position index.
fn validate(resources: &[Resource]) -> Result<HashMap<&str, usize>, ExecuteError> {
  let mut index = HashMap::with_capacity(resources.len());
  for (idx, resource) in resources.iter().enumerate() {
    if index.insert(resource.name.as_str(), idx).is_some() {
      return Err(ExecuteError::DuplicateResource(resource.name.clone()));
    }
  }

  for resource in resources {
    if let Some(notification) = resource
      .notifies
      .iter()
      .find(|n| !index.contains_key(n.target.as_str()))
    {
      return Err(ExecuteError::UnknownNotifyTarget {
        resource: resource.id(),
        target: notification.target.clone(),
      });
    }
  }

  Ok(index)
}

fn report_entry(resource: &Resource, outcome: Outcome, notified_by: Option<&str>) -> ResourceReport {
  ResourceReport {
    name: resource.name.clone(),
    kind: resource.kind.as_str(),
    outcome,
    notified_by: notified_by.map(str::to_string),
  }
}
