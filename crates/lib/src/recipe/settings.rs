//! Settings published by the setup role and the values derived from them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::RecipeError;

/// `keystone` settings section of the setup role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentitySettings {
  pub db: DbCredentials,
  #[serde(default)]
  pub debug: bool,
  #[serde(default)]
  pub verbose: bool,
  pub admin_token: String,
  #[serde(default = "default_auth_type")]
  pub auth_type: String,
  /// Directory-service options, written verbatim into the `[ldap]` section.
  #[serde(default)]
  pub ldap: BTreeMap<String, serde_json::Value>,
  #[serde(default)]
  pub pki: PkiSettings,
  /// Token lifetime in seconds.
  #[serde(default = "default_token_expiration")]
  pub token_expiration: u64,
}

fn default_auth_type() -> String {
  "sql".to_string()
}

fn default_token_expiration() -> u64 {
  86400
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbCredentials {
  pub username: String,
  pub password: String,
  pub name: String,
}

/// PKI flag and material as published by the setup node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PkiSettings {
  #[serde(default)]
  pub enabled: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub key: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub cert: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub cacert: Option<String>,
}

/// Database connection details handed to both templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DbInfo {
  pub user: String,
  pub pass: String,
  pub name: String,
  pub ipaddress: String,
}

/// Supported notification back ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationDriver {
  NoOp,
  Rpc,
  Log,
}

impl NotificationDriver {
  /// Python class path the service loads for this driver.
  pub fn class_path(&self) -> &'static str {
    match self {
      Self::NoOp => "keystone.openstack.common.notifier.no_op_notifier",
      Self::Rpc => "keystone.openstack.common.notifier.rpc_notifier",
      Self::Log => "keystone.openstack.common.notifier.log_notifier",
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::NoOp => "no_op",
      Self::Rpc => "rpc",
      Self::Log => "log",
    }
  }
}

impl FromStr for NotificationDriver {
  type Err = RecipeError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "no_op" => Ok(Self::NoOp),
      "rpc" => Ok(Self::Rpc),
      "log" => Ok(Self::Log),
      other => Err(RecipeError::UnsupportedNotificationDriver(other.to_string())),
    }
  }
}

impl fmt::Display for NotificationDriver {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Everything the recipe resolved from the topology for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeInputs {
  pub settings: IdentitySettings,
  pub db_info: DbInfo,
  pub ip_address: String,
  pub service_port: u16,
  pub admin_port: u16,
  pub admin_endpoint: String,
  pub public_endpoint: String,
  pub notification_driver: NotificationDriver,
}
