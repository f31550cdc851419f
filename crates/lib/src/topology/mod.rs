//! Cluster role and endpoint lookups.
//!
//! Recipes never reach for cluster data themselves. They receive a
//! [`Topology`] and ask it for role settings, endpoints and role membership.
//! [`StaticTopology`] answers from data loaded with the node file; other
//! implementations can front a live inventory service.
//!
//! # Example Topology
//!
//! ```yaml
//! roles:
//!   keystone-setup:
//!     members: 1
//!     settings:
//!       keystone: { admin_token: secret, db: { username: keystone, password: pw, name: keystone } }
//!   mysql-master:
//!     members: 1
//!     database: { host: 10.0.0.2 }
//! bind_endpoints:
//!   keystone:
//!     admin-api: { host: 10.0.0.5, port: 35357 }
//! access_endpoints:
//!   keystone-api:
//!     keystone:
//!       admin-api: { host: 10.0.0.10, port: 35357, scheme: https }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TopologyError {
  #[error("role not found: {0}")]
  RoleNotFound(String),

  #[error("role {role} has no {section} settings")]
  SettingsNotFound { role: String, section: String },

  #[error("no bind endpoint {name} for service {service}")]
  BindEndpointNotFound { service: String, name: String },

  #[error("no access endpoint {name} for service {service} in role {role}")]
  AccessEndpointNotFound {
    role: String,
    service: String,
    name: String,
  },

  #[error("role {0} does not provide a database endpoint")]
  DatabaseNotFound(String),
}

/// Host, port and scheme of a network endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
  pub host: String,
  pub port: u16,
  #[serde(default = "default_scheme")]
  pub scheme: String,
}

fn default_scheme() -> String {
  "http".to_string()
}

impl Endpoint {
  /// `scheme://host:port`
  pub fn url(&self) -> String {
    format!("{}://{}:{}", self.scheme, self.host, self.port)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseEndpoint {
  pub host: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub port: Option<u16>,
}

/// Lookups a recipe needs from the cluster.
pub trait Topology {
  /// Settings section published by the nodes of `role`.
  fn role_settings(&self, role: &str, section: &str) -> Result<serde_json::Value, TopologyError>;

  /// Address a local service should listen on.
  fn bind_endpoint(&self, service: &str, name: &str) -> Result<Endpoint, TopologyError>;

  /// Externally reachable address of a service provided by `role`.
  fn access_endpoint(&self, role: &str, service: &str, name: &str) -> Result<Endpoint, TopologyError>;

  /// Database served by the nodes of `role`.
  fn database_endpoint(&self, role: &str) -> Result<DatabaseEndpoint, TopologyError>;

  /// Number of nodes carrying `role`. Unknown roles have no members.
  fn role_count(&self, role: &str) -> usize;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleEntry {
  #[serde(default)]
  pub members: usize,
  #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
  pub settings: serde_json::Map<String, serde_json::Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub database: Option<DatabaseEndpoint>,
}

/// Topology backed by in-memory data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticTopology {
  #[serde(default)]
  pub roles: BTreeMap<String, RoleEntry>,
  /// service -> endpoint name -> endpoint
  #[serde(default)]
  pub bind_endpoints: BTreeMap<String, BTreeMap<String, Endpoint>>,
  /// role -> service -> endpoint name -> endpoint
  #[serde(default)]
  pub access_endpoints: BTreeMap<String, BTreeMap<String, BTreeMap<String, Endpoint>>>,
}

impl StaticTopology {
  /// Mutable settings section for `role`, created if missing.
  pub fn settings_mut(&mut self, role: &str, section: &str) -> &mut serde_json::Value {
    self
      .roles
      .entry(role.to_string())
      .or_default()
      .settings
      .entry(section.to_string())
      .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()))
  }
}

impl Topology for StaticTopology {
  fn role_settings(&self, role: &str, section: &str) -> Result<serde_json::Value, TopologyError> {
    let entry = self
      .roles
      .get(role)
      .ok_or_else(|| TopologyError::RoleNotFound(role.to_string()))?;
    entry
      .settings
      .get(section)
      .cloned()
      .ok_or_else(|| TopologyError::SettingsNotFound {
        role: role.to_string(),
        section: section.to_string(),
      })
  }

  fn bind_endpoint(&self, service: &str, name: &str) -> Result<Endpoint, TopologyError> {
    self
      .bind_endpoints
      .get(service)
      .and_then(|endpoints| endpoints.get(name))
      .cloned()
      .ok_or_else(|| TopologyError::BindEndpointNotFound {
        service: service.to_string(),
        name: name.to_string(),
      })
  }

  fn access_endpoint(&self, role: &str, service: &str, name: &str) -> Result<Endpoint, TopologyError> {
    self
      .access_endpoints
      .get(role)
      .and_then(|services| services.get(service))
      .and_then(|endpoints| endpoints.get(name))
      .cloned()
      .ok_or_else(|| TopologyError::AccessEndpointNotFound {
        role: role.to_string(),
        service: service.to_string(),
        name: name.to_string(),
      })
  }

  fn database_endpoint(&self, role: &str) -> Result<DatabaseEndpoint, TopologyError> {
    let entry = self
      .roles
      .get(role)
      .ok_or_else(|| TopologyError::RoleNotFound(role.to_string()))?;
    entry
      .database
      .clone()
      .ok_or_else(|| TopologyError::DatabaseNotFound(role.to_string()))
  }

  fn role_count(&self, role: &str) -> usize {
    self.roles.get(role).map(|r| r.members).unwrap_or(0)
  }
}
