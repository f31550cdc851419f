//! Stale HTTPS vhost removal on web-server nodes.

use idconverge_lib::execute::Outcome;
use idconverge_lib::recipe::WEBSERVER_RECIPE;

use super::common::TestNode;

fn webserver_node(platform: &str, apache_dir: &str) -> TestNode {
  let mut node = TestNode::new();
  node.node.platform = Some(platform.to_string());
  node.node.apache.dir = apache_dir.to_string();
  node.node.recipes.push(WEBSERVER_RECIPE.to_string());
  node
}

#[tokio::test]
async fn stale_vhost_is_removed_and_webserver_restarted_once() {
  let node = webserver_node("ubuntu", "/etc/apache2");
  let vhost = node.write("/etc/apache2/sites-enabled/openstack-keystone", "<VirtualHost *:443>");

  let report = node.converge().await;

  assert!(!vhost.exists());
  assert!(report.outcome("https_vhost").unwrap().is_updated());
  assert_eq!(node.runs("restart.log"), 1);

  let notified: Vec<_> = report.notified().collect();
  assert_eq!(notified.len(), 1);
  assert_eq!(notified[0].name, "restart_webserver");
  assert_eq!(notified[0].notified_by.as_deref(), Some("https_vhost"));

  // The restart is queued and runs after the last resource.
  assert_eq!(report.resources.last().unwrap().name, "restart_webserver");
}

#[tokio::test]
async fn no_vhost_means_no_restart() {
  let node = webserver_node("ubuntu", "/etc/apache2");

  let report = node.converge().await;

  assert!(report.outcome("https_vhost").unwrap().is_skipped());
  assert_eq!(
    report.outcome("restart_webserver"),
    Some(&Outcome::skipped("action nothing"))
  );
  assert_eq!(report.notified().count(), 0);
  assert_eq!(node.runs("restart.log"), 0);
}

#[tokio::test]
async fn vhost_location_follows_platform() {
  let node = webserver_node("centos", "/etc/httpd");
  let debian_style = node.write("/etc/httpd/sites-enabled/openstack-keystone", "keep");
  let redhat_style = node.write("/etc/httpd/conf.d/openstack-keystone", "remove");

  node.converge().await;

  assert!(debian_style.exists());
  assert!(!redhat_style.exists());
  assert_eq!(node.runs("restart.log"), 1);
}

#[tokio::test]
async fn nodes_without_webserver_leave_vhosts_alone() {
  let node = TestNode::new();
  let vhost = node.write("/etc/apache2/sites-enabled/openstack-keystone", "<VirtualHost *:443>");

  let report = node.converge().await;

  assert!(report.outcome("https_vhost").is_none());
  assert!(vhost.exists());
  assert_eq!(node.runs("restart.log"), 0);
}
