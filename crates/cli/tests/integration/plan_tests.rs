//! Plan command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn plan_lists_changes_without_applying() {
  let env = TestEnv::from_fixture("node.json");
  let db = env.write_host_file("/var/lib/keystone/keystone.db", "sqlite");

  env
    .idconverge_cmd()
    .arg("plan")
    .arg(&env.node_path)
    .assert()
    .success()
    .stdout(predicate::str::contains("Would change"))
    .stdout(predicate::str::contains("directory[config_dir]"))
    .stdout(predicate::str::contains("template[config]"));

  assert!(!env.host_path("/etc/keystone").exists());
  assert!(db.exists());
}

#[test]
fn plan_after_apply_shows_only_install() {
  let env = TestEnv::from_fixture("node.json");
  env.idconverge_cmd().arg("apply").arg(&env.node_path).assert().success();

  env
    .idconverge_cmd()
    .arg("plan")
    .arg(&env.node_path)
    .assert()
    .success()
    .stdout(predicate::str::contains("Would change 1 resource(s)"))
    .stdout(predicate::str::contains("execute[install]"))
    .stdout(predicate::str::contains("skipped: not_if exists("));
}

#[test]
fn plan_json_marks_dry_run() {
  let env = TestEnv::from_fixture("node.json");

  let output = env
    .idconverge_cmd()
    .args(["plan", "-o", "json"])
    .arg(&env.node_path)
    .output()
    .unwrap();
  assert!(output.status.success());

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["dry_run"], true);
  assert_eq!(json["resources"][0]["name"], "install");
  assert_eq!(json["resources"][0]["kind"], "execute");
  assert_eq!(json["resources"][0]["status"], "updated");
}

#[test]
fn plan_rejects_unsupported_driver() {
  let env = TestEnv::from_fixture("bad_driver.json");

  env
    .idconverge_cmd()
    .arg("plan")
    .arg(&env.node_path)
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to build identity recipe"));
}
