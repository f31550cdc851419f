//! Types for resource execution.
//!
//! This module defines the error types, outcome types and configuration
//! for converging an ordered list of resources.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::template::RenderError;

/// Errors that can occur while converging resources.
#[derive(Debug, Error)]
pub enum ExecuteError {
  /// I/O error on a managed path.
  #[error("io error on {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// Non-recursive creation with a missing parent directory.
  #[error("parent directory does not exist: {0}")]
  MissingParent(PathBuf),

  /// A directory resource found something else at its path.
  #[error("path exists but is not a directory: {0}")]
  NotADirectory(PathBuf),

  /// A file resource found a directory at its path.
  #[error("path exists but is not a regular file: {0}")]
  NotAFile(PathBuf),

  /// The command could not be started.
  #[error("failed to spawn command {cmd}: {source}")]
  Spawn {
    cmd: String,
    #[source]
    source: std::io::Error,
  },

  /// Command execution failed.
  #[error("command failed with exit code {code:?}: {cmd}")]
  CmdFailed { cmd: String, code: Option<i32> },

  #[error("command timed out after {timeout:?}: {cmd}")]
  Timeout { cmd: String, timeout: Duration },

  #[error("unknown user: {0}")]
  UnknownUser(String),

  #[error("unknown group: {0}")]
  UnknownGroup(String),

  /// Changing ownership failed.
  #[error("failed to change ownership of {path}: {message}")]
  Chown { path: PathBuf, message: String },

  /// Template rendering failed.
  #[error("render error: {0}")]
  Render(#[from] RenderError),

  /// Two resources share a name.
  #[error("duplicate resource name: {0}")]
  DuplicateResource(String),

  /// A notification names a resource that is not in the run.
  #[error("{resource} notifies unknown resource {target}")]
  UnknownNotifyTarget { resource: String, target: String },

  /// A resource action failed. Wraps the underlying error with the resource id.
  #[error("{resource} failed: {source}")]
  Resource {
    resource: String,
    #[source]
    source: Box<ExecuteError>,
  },
}

impl ExecuteError {
  pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    ExecuteError::Io {
      path: path.into(),
      source,
    }
  }
}

/// What happened to a single resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
  /// The system was changed (or would be, in dry-run mode).
  Updated { changes: Vec<String> },
  /// The system already matched the desired state.
  UpToDate,
  /// A guard or the resource's action prevented it from running.
  Skipped { reason: String },
}

impl Outcome {
  /// Build an outcome from a list of change descriptions.
  pub fn from_changes(changes: Vec<String>) -> Self {
    if changes.is_empty() {
      Outcome::UpToDate
    } else {
      Outcome::Updated { changes }
    }
  }

  pub fn skipped(reason: impl Into<String>) -> Self {
    Outcome::Skipped { reason: reason.into() }
  }

  pub fn is_updated(&self) -> bool {
    matches!(self, Outcome::Updated { .. })
  }

  pub fn is_skipped(&self) -> bool {
    matches!(self, Outcome::Skipped { .. })
  }
}

/// Result of converging a single resource.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceReport {
  pub name: String,
  pub kind: &'static str,
  #[serde(flatten)]
  pub outcome: Outcome,
  /// Name of the resource whose notification caused this entry.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub notified_by: Option<String>,
}

impl ResourceReport {
  /// Display identifier, e.g. `directory[config]`.
  pub fn id(&self) -> String {
    format!("{}[{}]", self.kind, self.name)
  }
}

/// Result of one convergence run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
  pub dry_run: bool,
  pub resources: Vec<ResourceReport>,
  #[serde(serialize_with = "serialize_millis")]
  pub elapsed: Duration,
}

impl RunReport {
  pub fn updated_count(&self) -> usize {
    self.resources.iter().filter(|r| r.outcome.is_updated()).count()
  }

  pub fn skipped_count(&self) -> usize {
    self.resources.iter().filter(|r| r.outcome.is_skipped()).count()
  }

  pub fn up_to_date_count(&self) -> usize {
    self
      .resources
      .iter()
      .filter(|r| r.outcome == Outcome::UpToDate)
      .count()
  }

  /// Returns true if any resource changed the system.
  pub fn is_changed(&self) -> bool {
    self.updated_count() > 0
  }

  /// Outcome of the first (non-notified) entry for a resource.
  pub fn outcome(&self, name: &str) -> Option<&Outcome> {
    self
      .resources
      .iter()
      .find(|r| r.name == name && r.notified_by.is_none())
      .map(|r| &r.outcome)
  }

  /// Entries produced by notifications.
  pub fn notified(&self) -> impl Iterator<Item = &ResourceReport> {
    self.resources.iter().filter(|r| r.notified_by.is_some())
  }
}

fn serialize_millis<S: serde::Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
  serializer.serialize_u64(duration.as_millis() as u64)
}

/// Configuration for a convergence run.
#[derive(Debug, Clone, Default)]
pub struct ExecuteConfig {
  /// Report what would change without touching the system.
  pub dry_run: bool,

  /// Shell to use for command execution.
  /// If None, uses /bin/sh (Unix) or powershell.exe (Windows).
  pub shell: Option<String>,

  /// Kill commands that run longer than this.
  pub timeout: Option<Duration>,
}
