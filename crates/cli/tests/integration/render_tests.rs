//! Render command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn render_prints_all_templates() {
  let env = TestEnv::from_fixture("node.json");

  env
    .idconverge_cmd()
    .arg("render")
    .arg(&env.node_path)
    .assert()
    .success()
    .stdout(predicate::str::contains("# ---- keystone.conf ----"))
    .stdout(predicate::str::contains("admin_token = tokentoken"))
    .stdout(predicate::str::contains("# ---- keystone-token-cleanup ----"))
    .stdout(predicate::str::contains("-h '10.0.0.2'"));

  assert!(!env.host_path("/etc/keystone").exists());
}

#[test]
fn render_single_template() {
  let env = TestEnv::from_fixture("node_pki.yaml");

  env
    .idconverge_cmd()
    .args(["render", "--template", "keystone.conf"])
    .arg(&env.node_path)
    .assert()
    .success()
    .stdout(predicate::str::starts_with("# Generated by idconverge"))
    .stdout(predicate::str::contains("notification_topics = notifications"))
    .stdout(predicate::str::contains("token_format = PKI"))
    .stdout(predicate::str::contains("DELETE FROM token").not());
}

#[test]
fn render_uses_template_overrides() {
  let env = TestEnv::from_fixture("node.json");
  let templates = env.temp.path().join("templates");
  std::fs::create_dir_all(&templates).unwrap();
  std::fs::write(
    templates.join("keystone-token-cleanup"),
    "db={{ keystone_db_name }}@{{ keystone_db_host }}\n",
  )
  .unwrap();

  env
    .idconverge_cmd()
    .args(["render", "-t", "keystone-token-cleanup", "--templates"])
    .arg(&templates)
    .arg(&env.node_path)
    .assert()
    .success()
    .stdout("db=keystone@10.0.0.2\n");
}

#[test]
fn render_unknown_template_fails() {
  let env = TestEnv::from_fixture("node.json");

  env
    .idconverge_cmd()
    .args(["render", "--template", "httpd.conf"])
    .arg(&env.node_path)
    .assert()
    .failure()
    .stderr(predicate::str::contains("Unknown template: httpd.conf"));
}

#[test]
fn render_json_maps_template_names() {
  let env = TestEnv::from_fixture("node.json");

  let output = env
    .idconverge_cmd()
    .args(["render", "--output", "json"])
    .arg(&env.node_path)
    .output()
    .unwrap();
  assert!(output.status.success());

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  let config = json["keystone.conf"].as_str().unwrap();
  assert!(config.contains("admin_token = tokentoken"));
  assert!(json["keystone-token-cleanup"].as_str().unwrap().contains("DELETE FROM token"));
}
