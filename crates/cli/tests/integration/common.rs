//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Get path to a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

/// Read fixture content.
pub fn fixture_content(name: &str) -> String {
  std::fs::read_to_string(fixture_path(name)).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// Isolated test environment.
///
/// Each test gets its own node file and a managed root with `/etc/cron.d`
/// already present, as on a real host.
pub struct TestEnv {
  pub temp: TempDir,
  pub node_path: PathBuf,
}

impl TestEnv {
  /// Create from a fixture file, keeping its extension.
  pub fn from_fixture(name: &str) -> Self {
    let temp = TempDir::new().unwrap();
    let extension = name.rsplit('.').next().unwrap();
    let node_path = temp.path().join(format!("node.{}", extension));
    std::fs::write(&node_path, fixture_content(name)).unwrap();
    let env = Self { temp, node_path };
    std::fs::create_dir_all(env.host_path("/etc/cron.d")).unwrap();
    env
  }

  /// Managed root (isolated per test).
  pub fn root_path(&self) -> PathBuf {
    let p = self.temp.path().join("root");
    std::fs::create_dir_all(&p).unwrap();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  /// A host path inside the managed root.
  pub fn host_path(&self, path: &str) -> PathBuf {
    self.root_path().join(path.trim_start_matches('/'))
  }

  /// Write a file at a host path inside the managed root.
  pub fn write_host_file(&self, path: &str, content: &str) -> PathBuf {
    let path = self.host_path(path);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, content).unwrap();
    path
  }

  pub fn read_host_file(&self, path: &str) -> String {
    std::fs::read_to_string(self.host_path(path)).unwrap()
  }

  /// Get a pre-configured Command for the idconverge binary.
  ///
  /// `IDCONVERGE_ROOT` points at the isolated root so no test touches `/`.
  pub fn idconverge_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("idconverge");
    cmd.env("IDCONVERGE_ROOT", self.root_path());
    cmd.env_remove("RUST_LOG");
    cmd
  }
}
