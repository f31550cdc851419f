//! Apply command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn apply_converges_node() {
  let env = TestEnv::from_fixture("node.json");

  env
    .idconverge_cmd()
    .arg("apply")
    .arg(&env.node_path)
    .assert()
    .success()
    .stdout(predicate::str::contains("Apply complete"))
    .stdout(predicate::str::contains("execute[pki_setup]"));

  let config = env.read_host_file("/etc/keystone/keystone.conf");
  assert!(config.contains("debug = true"));
  assert!(config.contains("bind_host = 0.0.0.0"));
  assert!(config.contains("public_endpoint = https://10.0.0.10:5000/"));
  assert!(env.host_path("/etc/cron.d/keystone-token-cleanup").exists());
  assert!(env.host_path("/etc/keystone/ssl/private/signing_key.pem").exists());
}

#[test]
fn apply_is_idempotent() {
  let env = TestEnv::from_fixture("node.json");

  env.idconverge_cmd().arg("apply").arg(&env.node_path).assert().success();

  let output = env
    .idconverge_cmd()
    .args(["--output", "json", "apply"])
    .arg(&env.node_path)
    .output()
    .unwrap();
  assert!(output.status.success());

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  let updated: Vec<_> = json["report"]["resources"]
    .as_array()
    .unwrap()
    .iter()
    .filter(|r| r["status"] == "updated")
    .map(|r| r["name"].as_str().unwrap().to_string())
    .collect();
  assert_eq!(updated, vec!["install"]);
}

#[test]
fn apply_with_root_flag() {
  let env = TestEnv::from_fixture("node.json");
  let other_root = env.temp.path().join("other");
  std::fs::create_dir_all(other_root.join("etc").join("cron.d")).unwrap();

  env
    .idconverge_cmd()
    .arg("apply")
    .arg(&env.node_path)
    .arg("--root")
    .arg(&other_root)
    .assert()
    .success();

  assert!(other_root.join("etc/keystone/keystone.conf").exists());
  assert!(!env.host_path("/etc/keystone").exists());
}

#[test]
fn apply_deletes_legacy_db() {
  let env = TestEnv::from_fixture("node.json");
  let db = env.write_host_file("/var/lib/keystone/keystone.db", "sqlite");

  env
    .idconverge_cmd()
    .arg("apply")
    .arg(&env.node_path)
    .assert()
    .success()
    .stdout(predicate::str::contains("file[legacy_db]"));

  assert!(!db.exists());
}

#[test]
fn apply_rejects_unsupported_driver_before_touching_files() {
  let env = TestEnv::from_fixture("bad_driver.json");

  env
    .idconverge_cmd()
    .arg("apply")
    .arg(&env.node_path)
    .assert()
    .failure()
    .stderr(predicate::str::contains("carrier-pigeon"))
    .stderr(predicate::str::contains("not supported"));

  assert!(!env.host_path("/etc/keystone").exists());
}

#[test]
fn apply_reports_failing_resource() {
  let env = TestEnv::from_fixture("node.json");
  let content = std::fs::read_to_string(&env.node_path)
    .unwrap()
    .replace(r#""install_command": "true""#, r#""install_command": "exit 7""#);
  std::fs::write(&env.node_path, content).unwrap();

  env
    .idconverge_cmd()
    .arg("apply")
    .arg(&env.node_path)
    .assert()
    .failure()
    .stderr(predicate::str::contains("execute[install]"))
    .stderr(predicate::str::contains("exit code Some(7)"));

  assert!(!env.host_path("/etc/keystone").exists());
}

#[test]
fn apply_removes_vhost_and_publishes_pki() {
  let env = TestEnv::from_fixture("node_pki.yaml");
  let vhost = env.write_host_file("/etc/httpd/conf.d/openstack-keystone", "<VirtualHost *:443>");

  env
    .idconverge_cmd()
    .arg("apply")
    .arg(&env.node_path)
    .arg("--publish")
    .assert()
    .success()
    .stdout(predicate::str::contains("execute[restart_webserver] (→ https_vhost)"))
    .stdout(predicate::str::contains("Published PKI material (key, cert, cacert)"));

  assert!(!vhost.exists());
  let config = env.read_host_file("/etc/keystone/keystone.conf");
  assert!(config.contains("bind_host = 10.0.0.5"));
  assert!(config.contains("rpc_notifier"));

  let node_file = std::fs::read_to_string(&env.node_path).unwrap();
  assert!(node_file.contains("KEYDATA"));
  assert!(node_file.contains("CADATA"));
}

#[test]
fn published_material_is_installed_on_next_apply() {
  let env = TestEnv::from_fixture("node_pki.yaml");

  env
    .idconverge_cmd()
    .arg("apply")
    .arg(&env.node_path)
    .arg("--publish")
    .assert()
    .success();

  env
    .idconverge_cmd()
    .args(["apply", "--verbose"])
    .arg(&env.node_path)
    .arg("--publish")
    .assert()
    .success()
    .stdout(predicate::str::contains("file[signing_key]"))
    .stdout(predicate::str::contains("Published PKI material").not());

  assert_eq!(
    env.read_host_file("/etc/keystone/ssl/private/signing_key.pem"),
    "KEYDATA\n"
  );
}

#[test]
fn apply_missing_node_file_fails() {
  let env = TestEnv::from_fixture("node.json");

  env
    .idconverge_cmd()
    .arg("apply")
    .arg(env.temp.path().join("missing.json"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to load node file"));
}
