//! Identity-service recipe.
//!
//! [`IdentityRecipe`] turns node attributes and cluster topology into the
//! ordered resource list that deploys the identity service on one node:
//! install, PKI provisioning, legacy cleanup, web-server vhost removal and
//! the rendered configuration and token-cleanup job.
//!
//! All topology lookups and the notification-driver check happen in
//! [`IdentityRecipe::resolve`], before a single resource exists. A bad
//! setting therefore fails the run without touching the filesystem.

mod publish;
mod settings;

use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::consts::SERVICE_NAME;
use crate::node::NodeAttributes;
use crate::platform::Layout;
use crate::resource::{
  Attributes, Directory, Execute, ExecuteAction, File, Predicate, Resource, Template, Timing,
};
use crate::template::{IDENTITY_CONFIG, TOKEN_CLEANUP};
use crate::topology::{Topology, TopologyError};

pub use publish::publish_pki;
pub use settings::*;

/// Run-list entry that marks a node as running the web server.
pub const WEBSERVER_RECIPE: &str = "apache2";

/// VIP that makes the service bind to its admin endpoint address.
const ADMIN_VIP: &str = "keystone-admin-api";

const ANY_ADDRESS: &str = "0.0.0.0";

#[derive(Debug, Error)]
pub enum RecipeError {
  #[error("notification driver {0:?} is not supported (expected no_op, rpc or log)")]
  UnsupportedNotificationDriver(String),

  #[error("topology lookup failed: {0}")]
  Lookup(#[from] TopologyError),

  #[error("invalid {section} settings for role {role}: {source}")]
  Settings {
    role: String,
    section: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("{section} settings of role {role} must be a map")]
  NotAMap { role: String, section: String },

  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Builds the identity-service resources for one node.
pub struct IdentityRecipe<'a, T: ?Sized> {
  node: &'a NodeAttributes,
  topology: &'a T,
  layout: &'a Layout,
}

impl<'a, T: Topology + ?Sized> IdentityRecipe<'a, T> {
  pub fn new(node: &'a NodeAttributes, topology: &'a T, layout: &'a Layout) -> Self {
    Self { node, topology, layout }
  }

  /// Resolve every value the recipe needs from node attributes and topology.
  pub fn resolve(&self) -> Result<RecipeInputs, RecipeError> {
    let attrs = &self.node.keystone;
    let notification_driver: NotificationDriver = attrs.notification.driver.parse()?;

    let settings = self.settings()?;
    let admin_bind = self.topology.bind_endpoint(SERVICE_NAME, "admin-api")?;
    let service_bind = self.topology.bind_endpoint(SERVICE_NAME, "service-api")?;
    let database = self.topology.database_endpoint(&attrs.mysql_role)?;
    let admin_endpoint = self
      .topology
      .access_endpoint(&attrs.api_role, SERVICE_NAME, "admin-api")?;
    let public_endpoint = self
      .topology
      .access_endpoint(&attrs.api_role, SERVICE_NAME, "service-api")?;

    // Behind the HA proxy the VIP owns the wildcard address.
    let ip_address = if self.topology.role_count(&attrs.ha_role) > 0 && self.node.has_vip(ADMIN_VIP) {
      admin_bind.host.clone()
    } else {
      ANY_ADDRESS.to_string()
    };
    debug!(ip_address = %ip_address, driver = %notification_driver, "resolved recipe inputs");

    let db_info = DbInfo {
      user: settings.db.username.clone(),
      pass: settings.db.password.clone(),
      name: settings.db.name.clone(),
      ipaddress: database.host,
    };

    Ok(RecipeInputs {
      settings,
      db_info,
      ip_address,
      service_port: service_bind.port,
      admin_port: admin_bind.port,
      admin_endpoint: admin_endpoint.url(),
      public_endpoint: public_endpoint.url(),
      notification_driver,
    })
  }

  /// Resolve inputs and build the ordered resource list.
  pub fn resources(&self) -> Result<Vec<Resource>, RecipeError> {
    let inputs = self.resolve()?;
    let resources = self.build(&inputs);
    info!(resources = resources.len(), "built identity recipe");
    Ok(resources)
  }

  /// Ordered resource list for already-resolved inputs.
  pub fn build(&self, inputs: &RecipeInputs) -> Vec<Resource> {
    let attrs = &self.node.keystone;
    let layout = self.layout;
    let owned = || Attributes::owned_by(attrs.user.as_deref(), attrs.group.as_deref());

    let mut resources = vec![
      Resource::new("install", Execute::new(&attrs.install_command)),
      Resource::new(
        "config_dir",
        Directory::new(layout.config_dir()).attrs(owned().mode(0o700)),
      ),
      Resource::new(
        "pki_setup",
        Execute::new(&attrs.pki_setup_command)
          .run_as(attrs.user.as_deref(), attrs.group.as_deref())
          .cwd(layout.config_dir()),
      )
      .not_if(Predicate::path_exists(layout.signing_key())),
      Resource::new("log", File::new(layout.log_file()).attrs(owned().mode(0o600)))
        .only_if(Predicate::path_exists(layout.log_file())),
      Resource::new("ssl", Directory::new(layout.ssl_dir()).attrs(owned().mode(0o755))),
      Resource::new(
        "ssl/certs",
        Directory::new(layout.certs_dir()).attrs(owned().mode(0o755)),
      ),
      Resource::new(
        "ssl/private",
        Directory::new(layout.private_dir()).attrs(owned().mode(0o700)),
      ),
    ];

    if attrs.pki.enabled {
      let pki = &inputs.settings.pki;
      let material = [
        ("signing_key", layout.signing_key(), 0o400, &pki.key),
        ("signing_cert", layout.signing_cert(), 0o644, &pki.cert),
        ("ca", layout.ca_cert(), 0o444, &pki.cacert),
      ];
      for (name, path, mode, content) in material {
        match content {
          Some(content) => resources.push(Resource::new(
            name,
            File::new(path).content(content.as_str()).attrs(owned().mode(mode)),
          )),
          None => warn!(resource = name, role = %attrs.setup_role, "pki enabled but no material published"),
        }
      }
    }

    resources.push(Resource::new("legacy_db", File::delete(layout.legacy_db())));

    if self.node.runs_recipe(WEBSERVER_RECIPE) {
      let vhost = layout.vhost_file(self.node.platform_family(), &self.node.apache.dir);
      resources.push(
        Resource::new("https_vhost", File::delete(vhost.clone()))
          .only_if(Predicate::path_exists(vhost))
          .notifies("restart_webserver", Timing::Delayed),
      );
      resources.push(Resource::new(
        "restart_webserver",
        Execute::new(&self.node.apache.restart_command).action(ExecuteAction::Nothing),
      ));
    }

    resources.push(Resource::new(
      "config",
      Template::new(IDENTITY_CONFIG, layout.config_file(), self.config_variables(inputs))
        .attrs(owned().mode(0o600)),
    ));
    resources.push(Resource::new(
      "token_cleanup",
      Template::new(TOKEN_CLEANUP, layout.cron_file(), self.cleanup_variables(inputs)).attrs(
        Attributes::owned_by(attrs.cron_owner.as_deref(), attrs.cron_group.as_deref()).mode(0o600),
      ),
    ));

    resources
  }

  /// Template name and variables for every template the recipe renders.
  pub fn template_variables(&self, inputs: &RecipeInputs) -> Vec<(&'static str, serde_json::Value)> {
    vec![
      (IDENTITY_CONFIG, self.config_variables(inputs)),
      (TOKEN_CLEANUP, self.cleanup_variables(inputs)),
    ]
  }

  fn settings(&self) -> Result<IdentitySettings, RecipeError> {
    let role = &self.node.keystone.setup_role;
    let section = self.topology.role_settings(role, SERVICE_NAME)?;
    serde_json::from_value(section).map_err(|e| RecipeError::Settings {
      role: role.clone(),
      section: SERVICE_NAME.to_string(),
      source: e,
    })
  }

  fn config_variables(&self, inputs: &RecipeInputs) -> serde_json::Value {
    let settings = &inputs.settings;
    let layout = self.layout;
    serde_json::json!({
      "debug": settings.debug,
      "verbose": settings.verbose,
      "db_info": {
        "user": inputs.db_info.user,
        "pass": inputs.db_info.pass,
        "name": inputs.db_info.name,
        "ipaddress": inputs.db_info.ipaddress,
      },
      "ip_address": inputs.ip_address,
      "service_port": inputs.service_port,
      "admin_port": inputs.admin_port,
      "admin_token": settings.admin_token,
      "member_role_id": self.node.keystone.member_role_id,
      "auth_type": settings.auth_type,
      "ldap_options": settings.ldap,
      "pki_token_signing": settings.pki.enabled,
      "token_expiration": settings.token_expiration,
      "admin_endpoint": inputs.admin_endpoint,
      "public_endpoint": inputs.public_endpoint,
      "notification_driver": inputs.notification_driver.class_path(),
      "notification_topics": self.node.keystone.notification.topics,
      "log_dir": layout.log_dir().display().to_string(),
      "signing_certfile": layout.signing_cert().display().to_string(),
      "signing_keyfile": layout.signing_key().display().to_string(),
      "signing_ca_certs": layout.ca_cert().display().to_string(),
    })
  }

  fn cleanup_variables(&self, inputs: &RecipeInputs) -> serde_json::Value {
    serde_json::json!({
      "keystone_db_user": inputs.db_info.user,
      "keystone_db_password": inputs.db_info.pass,
      "keystone_db_host": inputs.db_info.ipaddress,
      "keystone_db_name": inputs.db_info.name,
    })
  }
}
