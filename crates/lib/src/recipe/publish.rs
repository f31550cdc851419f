//! Write generated PKI material back into the setup role's settings.

use tracing::{debug, info};

use super::RecipeError;
use crate::consts::SERVICE_NAME;
use crate::node::NodeAttributes;
use crate::platform::Layout;
use crate::topology::StaticTopology;

/// Store the node's PKI material in the setup role's settings.
///
/// Reads the signing key, signing cert and CA bundle from disk and records
/// each under `<setup_role>.keystone.pki` unless a value is already present.
/// Does nothing when PKI is disabled for the node.
///
/// Returns the keys that were newly set.
pub fn publish_pki(
  node: &NodeAttributes,
  layout: &Layout,
  topology: &mut StaticTopology,
) -> Result<Vec<&'static str>, RecipeError> {
  if !node.keystone.pki.enabled {
    debug!("pki disabled, nothing to publish");
    return Ok(Vec::new());
  }

  let role = &node.keystone.setup_role;
  let not_a_map = || RecipeError::NotAMap {
    role: role.clone(),
    section: SERVICE_NAME.to_string(),
  };

  let section = topology
    .settings_mut(role, SERVICE_NAME)
    .as_object_mut()
    .ok_or_else(not_a_map)?;
  let pki = section
    .entry("pki")
    .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()))
    .as_object_mut()
    .ok_or_else(not_a_map)?;

  let mut published = Vec::new();
  for (key, path) in [
    ("key", layout.signing_key()),
    ("cert", layout.signing_cert()),
    ("cacert", layout.ca_cert()),
  ] {
    if pki.get(key).is_some_and(|v| !v.is_null()) {
      continue;
    }
    let content = std::fs::read_to_string(&path).map_err(|e| RecipeError::Read { path, source: e })?;
    pki.insert(key.to_string(), serde_json::Value::String(content));
    published.push(key);
  }

  info!(role = %role, keys = ?published, "published pki material");
  Ok(published)
}
