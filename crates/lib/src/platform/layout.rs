//! Filesystem layout of a managed node.
//!
//! Every managed path hangs off a root, `/` on a real host. Tests and chroot
//! deployments point the root somewhere else and the whole tree follows.

use std::path::{Component, Path, PathBuf};

use crate::consts::{ROOT_ENV, SERVICE_NAME};

use super::family::PlatformFamily;

/// File name of the service's vhost in the web-server config tree.
const VHOST_NAME: &str = "openstack-keystone";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
  root: PathBuf,
}

impl Default for Layout {
  fn default() -> Self {
    Self {
      root: PathBuf::from("/"),
    }
  }
}

impl Layout {
  /// Layout rooted at `root`. The root is canonicalized when it exists.
  pub fn with_root(root: impl AsRef<Path>) -> Self {
    let root = root.as_ref();
    Self {
      root: dunce::canonicalize(root).unwrap_or_else(|_| root.to_path_buf()),
    }
  }

  /// Layout rooted at `$IDCONVERGE_ROOT`, or `/` when unset.
  pub fn from_env() -> Self {
    match std::env::var_os(ROOT_ENV) {
      Some(root) if !root.is_empty() => Self::with_root(PathBuf::from(root)),
      _ => Self::default(),
    }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Re-anchor an absolute host path under the layout root.
  pub fn rebase(&self, path: impl AsRef<Path>) -> PathBuf {
    let relative: PathBuf = path
      .as_ref()
      .components()
      .filter(|c| matches!(c, Component::Normal(_)))
      .collect();
    self.root.join(relative)
  }

  /// `/etc/keystone`
  pub fn config_dir(&self) -> PathBuf {
    self.root.join("etc").join(SERVICE_NAME)
  }

  pub fn config_file(&self) -> PathBuf {
    self.config_dir().join(format!("{}.conf", SERVICE_NAME))
  }

  pub fn ssl_dir(&self) -> PathBuf {
    self.config_dir().join("ssl")
  }

  pub fn certs_dir(&self) -> PathBuf {
    self.ssl_dir().join("certs")
  }

  pub fn private_dir(&self) -> PathBuf {
    self.ssl_dir().join("private")
  }

  pub fn signing_key(&self) -> PathBuf {
    self.private_dir().join("signing_key.pem")
  }

  pub fn signing_cert(&self) -> PathBuf {
    self.certs_dir().join("signing_cert.pem")
  }

  pub fn ca_cert(&self) -> PathBuf {
    self.certs_dir().join("ca.pem")
  }

  /// `/var/log/keystone`
  pub fn log_dir(&self) -> PathBuf {
    self.root.join("var").join("log").join(SERVICE_NAME)
  }

  pub fn log_file(&self) -> PathBuf {
    self.log_dir().join(format!("{}.log", SERVICE_NAME))
  }

  /// SQLite database left behind by the package's default configuration.
  pub fn legacy_db(&self) -> PathBuf {
    self
      .root
      .join("var")
      .join("lib")
      .join(SERVICE_NAME)
      .join(format!("{}.db", SERVICE_NAME))
  }

  pub fn cron_file(&self) -> PathBuf {
    self
      .root
      .join("etc")
      .join("cron.d")
      .join(format!("{}-token-cleanup", SERVICE_NAME))
  }

  /// Location of the service vhost for a web server configured in `webserver_dir`.
  pub fn vhost_file(&self, family: PlatformFamily, webserver_dir: &str) -> PathBuf {
    let base = self.rebase(webserver_dir);
    match family.vhost_subdir() {
      Some(sub) => base.join(sub).join(VHOST_NAME),
      None => base.join(VHOST_NAME),
    }
  }
}
