//! Node attributes: every recipe knob with its default.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::platform::PlatformFamily;

/// Attributes of the node being converged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeAttributes {
  /// Platform name such as `ubuntu` or `centos`. Detected from the host when unset.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub platform: Option<String>,
  /// Recipes in the node's run list.
  #[serde(default)]
  pub recipes: Vec<String>,
  /// Virtual IPs keyed by name, e.g. `keystone-admin-api`.
  #[serde(default)]
  pub vips: BTreeMap<String, String>,
  #[serde(default)]
  pub apache: WebServerAttributes,
  #[serde(default)]
  pub keystone: IdentityAttributes,
}

impl NodeAttributes {
  /// Whether `recipe` is in the run list.
  pub fn runs_recipe(&self, recipe: &str) -> bool {
    self.recipes.iter().any(|r| r == recipe)
  }

  pub fn has_vip(&self, name: &str) -> bool {
    self.vips.contains_key(name)
  }

  /// Platform family from the `platform` attribute, or the running host.
  pub fn platform_family(&self) -> PlatformFamily {
    match &self.platform {
      Some(name) => PlatformFamily::from_platform(name),
      None => PlatformFamily::detect(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebServerAttributes {
  /// Web-server configuration directory.
  #[serde(default = "default_apache_dir")]
  pub dir: String,
  #[serde(default = "default_restart_command")]
  pub restart_command: String,
}

impl Default for WebServerAttributes {
  fn default() -> Self {
    Self {
      dir: default_apache_dir(),
      restart_command: default_restart_command(),
    }
  }
}

fn default_apache_dir() -> String {
  "/etc/apache2".to_string()
}

fn default_restart_command() -> String {
  "service apache2 restart".to_string()
}

/// Identity-service knobs of the node.
///
/// `user`, `group`, `cron_owner` and `cron_group` set to `null` leave
/// ownership unmanaged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityAttributes {
  pub user: Option<String>,
  pub group: Option<String>,
  pub cron_owner: Option<String>,
  pub cron_group: Option<String>,
  pub setup_role: String,
  pub mysql_role: String,
  pub api_role: String,
  pub ha_role: String,
  pub member_role_id: String,
  pub pki: PkiAttributes,
  pub notification: NotificationAttributes,
  pub install_command: String,
  pub pki_setup_command: String,
}

impl Default for IdentityAttributes {
  fn default() -> Self {
    Self {
      user: Some("keystone".to_string()),
      group: Some("keystone".to_string()),
      cron_owner: Some("root".to_string()),
      cron_group: Some("root".to_string()),
      setup_role: "keystone-setup".to_string(),
      mysql_role: "mysql-master".to_string(),
      api_role: "keystone-api".to_string(),
      ha_role: "openstack-ha".to_string(),
      member_role_id: "9fe2ff9ee4384b1894a90878d3e92bab".to_string(),
      pki: PkiAttributes::default(),
      notification: NotificationAttributes::default(),
      install_command: "genastack keystone".to_string(),
      pki_setup_command: "keystone-manage pki_setup".to_string(),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PkiAttributes {
  #[serde(default)]
  pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAttributes {
  /// One of `no_op`, `rpc` or `log`.
  #[serde(default = "default_driver")]
  pub driver: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub topics: Option<String>,
}

impl Default for NotificationAttributes {
  fn default() -> Self {
    Self {
      driver: default_driver(),
      topics: None,
    }
  }
}

fn default_driver() -> String {
  "no_op".to_string()
}
