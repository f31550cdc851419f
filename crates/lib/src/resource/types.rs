//! Resource types.
//!
//! [`Resource`] pairs a name, guards and notifications with one of the closed
//! set of [`ResourceKind`]s. The name is unique within a run and is how other
//! resources address it in notifications.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use super::guard::{Guard, Predicate};

/// Ownership and permission bits for a filesystem resource.
///
/// `None` leaves the corresponding property unmanaged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
  pub owner: Option<String>,
  pub group: Option<String>,
  pub mode: Option<u32>,
}

impl Attributes {
  pub fn new() -> Self {
    Self::default()
  }

  /// Attributes owned by the given user and group (either may be unmanaged).
  pub fn owned_by(owner: Option<&str>, group: Option<&str>) -> Self {
    Self {
      owner: owner.map(str::to_string),
      group: group.map(str::to_string),
      mode: None,
    }
  }

  pub fn mode(mut self, mode: u32) -> Self {
    self.mode = Some(mode);
    self
  }
}

/// Ensure a directory exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
  pub path: PathBuf,
  pub attrs: Attributes,
  /// Create missing parents. When false a missing parent is an error.
  pub recursive: bool,
}

impl Directory {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      attrs: Attributes::default(),
      recursive: false,
    }
  }

  pub fn attrs(mut self, attrs: Attributes) -> Self {
    self.attrs = attrs;
    self
  }

  pub fn recursive(mut self, recursive: bool) -> Self {
    self.recursive = recursive;
    self
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileAction {
  /// Ensure the file exists (with content, when given).
  Create,
  /// Remove the file if it exists.
  Delete,
}

/// Ensure a file exists with the given content and attributes, or is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
  pub path: PathBuf,
  pub action: FileAction,
  /// Desired content. `None` leaves an existing file's content alone.
  pub content: Option<String>,
  pub attrs: Attributes,
}

impl File {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      action: FileAction::Create,
      content: None,
      attrs: Attributes::default(),
    }
  }

  pub fn delete(path: impl Into<PathBuf>) -> Self {
    Self {
      action: FileAction::Delete,
      ..Self::new(path)
    }
  }

  pub fn content(mut self, content: impl Into<String>) -> Self {
    self.content = Some(content.into());
    self
  }

  pub fn attrs(mut self, attrs: Attributes) -> Self {
    self.attrs = attrs;
    self
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecuteAction {
  /// Run the command when the executor reaches the resource.
  Run,
  /// Only run when notified by another resource.
  Nothing,
}

/// Run a shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execute {
  pub command: String,
  pub action: ExecuteAction,
  pub user: Option<String>,
  pub group: Option<String>,
  pub cwd: Option<PathBuf>,
  pub env: BTreeMap<String, String>,
}

impl Execute {
  pub fn new(command: impl Into<String>) -> Self {
    Self {
      command: command.into(),
      action: ExecuteAction::Run,
      user: None,
      group: None,
      cwd: None,
      env: BTreeMap::new(),
    }
  }

  pub fn action(mut self, action: ExecuteAction) -> Self {
    self.action = action;
    self
  }

  pub fn run_as(mut self, user: Option<&str>, group: Option<&str>) -> Self {
    self.user = user.map(str::to_string);
    self.group = group.map(str::to_string);
    self
  }

  pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
    self.cwd = Some(cwd.into());
    self
  }

  pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.env.insert(key.into(), value.into());
    self
  }
}

/// Render a named template and write it to a path.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
  pub source: String,
  pub path: PathBuf,
  pub variables: serde_json::Value,
  pub attrs: Attributes,
}

impl Template {
  pub fn new(source: impl Into<String>, path: impl Into<PathBuf>, variables: serde_json::Value) -> Self {
    Self {
      source: source.into(),
      path: path.into(),
      variables,
      attrs: Attributes::default(),
    }
  }

  pub fn attrs(mut self, attrs: Attributes) -> Self {
    self.attrs = attrs;
    self
  }
}

/// The closed set of resource kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceKind {
  Directory(Directory),
  File(File),
  Execute(Execute),
  Template(Template),
}

impl ResourceKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      ResourceKind::Directory(_) => "directory",
      ResourceKind::File(_) => "file",
      ResourceKind::Execute(_) => "execute",
      ResourceKind::Template(_) => "template",
    }
  }
}

impl From<Directory> for ResourceKind {
  fn from(value: Directory) -> Self {
    ResourceKind::Directory(value)
  }
}

impl From<File> for ResourceKind {
  fn from(value: File) -> Self {
    ResourceKind::File(value)
  }
}

impl From<Execute> for ResourceKind {
  fn from(value: Execute) -> Self {
    ResourceKind::Execute(value)
  }
}

impl From<Template> for ResourceKind {
  fn from(value: Template) -> Self {
    ResourceKind::Template(value)
  }
}

/// When a notified resource runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Timing {
  /// Right after the notifying resource.
  Immediate,
  /// Once, after the last resource of the run.
  Delayed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
  pub target: String,
  pub timing: Timing,
}

/// A named unit of desired state.
#[derive(Debug, Clone)]
pub struct Resource {
  pub name: String,
  pub kind: ResourceKind,
  pub guards: Vec<Guard>,
  pub notifies: Vec<Notification>,
}

impl Resource {
  pub fn new(name: impl Into<String>, kind: impl Into<ResourceKind>) -> Self {
    Self {
      name: name.into(),
      kind: kind.into(),
      guards: Vec::new(),
      notifies: Vec::new(),
    }
  }

  pub fn only_if(mut self, predicate: Predicate) -> Self {
    self.guards.push(Guard::only_if(predicate));
    self
  }

  pub fn not_if(mut self, predicate: Predicate) -> Self {
    self.guards.push(Guard::not_if(predicate));
    self
  }

  /// Notify `target` when this resource is updated.
  pub fn notifies(mut self, target: impl Into<String>, timing: Timing) -> Self {
    self.notifies.push(Notification {
      target: target.into(),
      timing,
    });
    self
  }

  /// Returns the first guard that blocks this resource, if any.
  pub fn blocking_guard(&self) -> Option<&Guard> {
    self.guards.iter().find(|g| !g.allows())
  }

  /// Display identifier, e.g. `directory[config]`.
  pub fn id(&self) -> String {
    format!("{}[{}]", self.kind.as_str(), self.name)
  }
}

impl fmt::Display for Resource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}[{}]", self.kind.as_str(), self.name)
  }
}
