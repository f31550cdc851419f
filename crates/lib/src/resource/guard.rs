//! Guards gating resource actions.
//!
//! Guards hold deferred predicates. Nothing is evaluated when a guard is
//! declared; the executor calls [`Guard::allows`] when it reaches the owning
//! resource, so a guard can observe files created by earlier resources.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A deferred boolean check.
#[derive(Clone)]
pub enum Predicate {
  /// True when the path exists at evaluation time.
  PathExists(PathBuf),
  /// Arbitrary check, described by a label for reports.
  Check {
    label: String,
    check: Arc<dyn Fn() -> bool + Send + Sync>,
  },
}

impl Predicate {
  pub fn path_exists(path: impl Into<PathBuf>) -> Self {
    Predicate::PathExists(path.into())
  }

  pub fn check<F>(label: impl Into<String>, check: F) -> Self
  where
    F: Fn() -> bool + Send + Sync + 'static,
  {
    Predicate::Check {
      label: label.into(),
      check: Arc::new(check),
    }
  }

  /// Evaluate the predicate against the current system state.
  pub fn evaluate(&self) -> bool {
    match self {
      Predicate::PathExists(path) => Path::new(path).exists(),
      Predicate::Check { check, .. } => check(),
    }
  }
}

impl fmt::Display for Predicate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Predicate::PathExists(path) => write!(f, "exists({})", path.display()),
      Predicate::Check { label, .. } => write!(f, "{}", label),
    }
  }
}

impl fmt::Debug for Predicate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Predicate({})", self)
  }
}

/// `only_if` / `not_if` gate for a resource.
#[derive(Debug, Clone)]
pub enum Guard {
  /// Run only when the predicate holds.
  OnlyIf(Predicate),
  /// Skip when the predicate holds.
  NotIf(Predicate),
}

impl Guard {
  pub fn only_if(predicate: Predicate) -> Self {
    Guard::OnlyIf(predicate)
  }

  pub fn not_if(predicate: Predicate) -> Self {
    Guard::NotIf(predicate)
  }

  /// Returns true when the guarded action may run.
  pub fn allows(&self) -> bool {
    match self {
      Guard::OnlyIf(p) => p.evaluate(),
      Guard::NotIf(p) => !p.evaluate(),
    }
  }
}

impl fmt::Display for Guard {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Guard::OnlyIf(p) => write!(f, "only_if {}", p),
      Guard::NotIf(p) => write!(f, "not_if {}", p),
    }
  }
}
