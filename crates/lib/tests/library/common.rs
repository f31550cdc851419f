//! Shared helpers for library integration tests.

use std::path::{Path, PathBuf};

use idconverge_lib::execute::{ExecuteConfig, Executor, RunReport};
use idconverge_lib::node::NodeAttributes;
use idconverge_lib::platform::Layout;
use idconverge_lib::recipe::{IdentityRecipe, RecipeError};
use idconverge_lib::resource::Resource;
use idconverge_lib::template::TemplateStore;
use idconverge_lib::topology::StaticTopology;
use serde_json::json;
use tempfile::TempDir;

/// A node rooted in a temporary directory.
///
/// Ownership is left unmanaged and the install, key generation and
/// web-server restart commands are replaced by shell one-liners that
/// record each invocation in a log file under the root.
pub struct TestNode {
  pub temp: TempDir,
  pub layout: Layout,
  pub node: NodeAttributes,
  pub topology: StaticTopology,
}

impl TestNode {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let layout = Layout::with_root(temp.path());
    std::fs::create_dir_all(layout.rebase("/etc/cron.d")).unwrap();

    let root = layout.root().display().to_string();
    let mut node = NodeAttributes {
      platform: Some("ubuntu".to_string()),
      ..Default::default()
    };
    let keystone = &mut node.keystone;
    keystone.user = None;
    keystone.group = None;
    keystone.cron_owner = None;
    keystone.cron_group = None;
    keystone.install_command = format!("echo install >> '{root}/install.log'");
    keystone.pki_setup_command = format!(
      "mkdir -p ssl/private ssl/certs \
       && echo KEYDATA > ssl/private/signing_key.pem \
       && echo CERTDATA > ssl/certs/signing_cert.pem \
       && echo CADATA > ssl/certs/ca.pem \
       && echo run >> '{root}/pki_setup.log'"
    );
    node.apache.restart_command = format!("echo restart >> '{root}/restart.log'");

    let topology = serde_json::from_value(json!({
      "roles": {
        "keystone-setup": {
          "members": 1,
          "settings": {
            "keystone": {
              "db": { "username": "keystone", "password": "dbpass", "name": "keystone" },
              "admin_token": "tokentoken"
            }
          }
        },
        "mysql-master": { "members": 1, "database": { "host": "10.0.0.2" } }
      },
      "bind_endpoints": {
        "keystone": {
          "admin-api": { "host": "10.0.0.5", "port": 35357 },
          "service-api": { "host": "10.0.0.5", "port": 5000 }
        }
      },
      "access_endpoints": {
        "keystone-api": {
          "keystone": {
            "admin-api": { "host": "10.0.0.10", "port": 35357 },
            "service-api": { "host": "10.0.0.10", "port": 5000 }
          }
        }
      }
    }))
    .unwrap();

    Self {
      temp,
      layout,
      node,
      topology,
    }
  }

  pub fn path(&self, host_path: &str) -> PathBuf {
    self.layout.rebase(host_path)
  }

  /// Write a file at a host path, creating parents.
  pub fn write(&self, host_path: &str, content: &str) -> PathBuf {
    let path = self.path(host_path);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, content).unwrap();
    path
  }

  pub fn resources(&self) -> Result<Vec<Resource>, RecipeError> {
    IdentityRecipe::new(&self.node, &self.topology, &self.layout).resources()
  }

  pub async fn converge(&self) -> RunReport {
    self.converge_with(false).await
  }

  pub async fn plan(&self) -> RunReport {
    self.converge_with(true).await
  }

  async fn converge_with(&self, dry_run: bool) -> RunReport {
    let resources = self.resources().unwrap();
    let executor = Executor::new(
      TemplateStore::builtin().unwrap(),
      ExecuteConfig {
        dry_run,
        ..Default::default()
      },
    );
    executor.converge(&resources).await.unwrap()
  }

  /// Number of times a logged command ran.
  pub fn runs(&self, log: &str) -> usize {
    std::fs::read_to_string(self.layout.root().join(log))
      .map(|s| s.lines().count())
      .unwrap_or(0)
  }
}

#[cfg(unix)]
pub fn mode_of(path: &Path) -> u32 {
  use std::os::unix::fs::PermissionsExt;
  std::fs::metadata(path).unwrap().permissions().mode() & 0o7777
}
