//! Node file: the attributes of this node plus the cluster topology.
//!
//! A node file is JSON (`.json`) or YAML (`.yaml` / `.yml`) with two
//! top-level keys:
//!
//! ```yaml
//! node:
//!   platform: ubuntu
//!   recipes: [apache2]
//!   keystone:
//!     pki: { enabled: true }
//!     notification: { driver: rpc }
//! topology:
//!   roles: { ... }
//! ```
//!
//! Every node attribute has a default, so a minimal `node` section is `{}`.

mod types;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::topology::StaticTopology;

pub use types::*;

#[derive(Debug, Error)]
pub enum NodeError {
  #[error("failed to read node file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to write node file {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid JSON in {path}: {source}")]
  Json {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("invalid YAML in {path}: {source}")]
  Yaml {
    path: PathBuf,
    #[source]
    source: serde_yaml::Error,
  },

  #[error("unsupported node file format: {0} (expected .json, .yaml or .yml)")]
  UnsupportedFormat(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
  Json,
  Yaml,
}

impl Format {
  fn of(path: &Path) -> Result<Self, NodeError> {
    match path.extension().and_then(|e| e.to_str()) {
      Some("json") => Ok(Format::Json),
      Some("yaml") | Some("yml") => Ok(Format::Yaml),
      _ => Err(NodeError::UnsupportedFormat(path.to_path_buf())),
    }
  }
}

/// Parsed node file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeFile {
  #[serde(default)]
  pub node: NodeAttributes,
  #[serde(default)]
  pub topology: StaticTopology,
}

impl NodeFile {
  /// Load a node file, picking the parser from the extension.
  pub fn load(path: &Path) -> Result<Self, NodeError> {
    let format = Format::of(path)?;
    let content = fs::read_to_string(path).map_err(|e| NodeError::Read {
      path: path.to_path_buf(),
      source: e,
    })?;

    let node_file = match format {
      Format::Json => serde_json::from_str(&content).map_err(|e| NodeError::Json {
        path: path.to_path_buf(),
        source: e,
      })?,
      Format::Yaml => serde_yaml::from_str(&content).map_err(|e| NodeError::Yaml {
        path: path.to_path_buf(),
        source: e,
      })?,
    };

    debug!(path = %path.display(), "loaded node file");
    Ok(node_file)
  }

  /// Write the node file back in the format its extension names.
  pub fn save(&self, path: &Path) -> Result<(), NodeError> {
    let content = match Format::of(path)? {
      Format::Json => serde_json::to_string_pretty(self).map_err(|e| NodeError::Json {
        path: path.to_path_buf(),
        source: e,
      })?,
      Format::Yaml => serde_yaml::to_string(self).map_err(|e| NodeError::Yaml {
        path: path.to_path_buf(),
        source: e,
      })?,
    };

    fs::write(path, content).map_err(|e| NodeError::Write {
      path: path.to_path_buf(),
      source: e,
    })?;

    info!(path = %path.display(), "saved node file");
    Ok(())
  }
}
