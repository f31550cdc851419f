//! Template rendering.
//!
//! The executor only knows templates by name and hands rendering to a
//! [`Renderer`]. [`TemplateStore`] is the stock renderer: it carries the
//! built-in templates and lets a directory override any of them by file name.

use std::path::{Path, PathBuf};

use minijinja::{Environment, UndefinedBehavior};
use thiserror::Error;
use tracing::debug;

/// Primary service configuration.
pub const IDENTITY_CONFIG: &str = "keystone.conf";
/// Scheduled token cleanup job.
pub const TOKEN_CLEANUP: &str = "keystone-token-cleanup";

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
  (IDENTITY_CONFIG, include_str!("../../templates/keystone.conf.j2")),
  (TOKEN_CLEANUP, include_str!("../../templates/keystone-token-cleanup.j2")),
];

#[derive(Debug, Error)]
pub enum RenderError {
  #[error("failed to read template override {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error(transparent)]
  Template(#[from] minijinja::Error),
}

/// Renders a named template against a set of variables.
pub trait Renderer {
  fn render(&self, name: &str, variables: &serde_json::Value) -> Result<String, RenderError>;
}

/// Built-in templates, optionally overridden from a directory.
pub struct TemplateStore {
  env: Environment<'static>,
}

impl TemplateStore {
  /// Store with only the built-in templates.
  pub fn builtin() -> Result<Self, RenderError> {
    let mut env = new_environment();
    for &(name, source) in BUILTIN_TEMPLATES {
      env.add_template(name, source)?;
    }
    Ok(Self { env })
  }

  /// Store where `<dir>/<name>` replaces the built-in template `name`.
  pub fn with_overrides(dir: &Path) -> Result<Self, RenderError> {
    let mut env = new_environment();
    for &(name, source) in BUILTIN_TEMPLATES {
      let path = dir.join(name);
      if path.is_file() {
        debug!(template = name, path = %path.display(), "using template override");
        let content = std::fs::read_to_string(&path).map_err(|e| RenderError::Read {
          path: path.clone(),
          source: e,
        })?;
        env.add_template_owned(name.to_string(), content)?;
      } else {
        env.add_template(name, source)?;
      }
    }
    Ok(Self { env })
  }

  /// Names of all templates known to the store.
  pub fn names() -> impl Iterator<Item = &'static str> {
    BUILTIN_TEMPLATES.iter().map(|(name, _)| *name)
  }
}

impl Renderer for TemplateStore {
  fn render(&self, name: &str, variables: &serde_json::Value) -> Result<String, RenderError> {
    let template = self.env.get_template(name)?;
    Ok(template.render(variables)?)
  }
}

fn new_environment() -> Environment<'static> {
  let mut env = Environment::new();
  env.set_undefined_behavior(UndefinedBehavior::Strict);
  env.set_trim_blocks(true);
  env.set_lstrip_blocks(true);
  env.set_keep_trailing_newline(true);
  env
}
