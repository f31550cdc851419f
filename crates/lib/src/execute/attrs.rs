//! Ownership and permission convergence.
//!
//! ## Platform Behavior
//!
//! - **Unix**: compares mode bits, uid and gid against the desired attributes
//!   and applies only what differs
//! - **Windows**: attributes are not managed; a warning is logged once per path

use std::path::Path;

use tracing::debug;

use crate::resource::Attributes;

use super::types::ExecuteError;

/// Bring a path's owner, group and mode in line with `attrs`.
///
/// Returns a description of every change made (or that would be made in
/// dry-run mode). An empty list means the path already matched.
#[cfg(unix)]
pub async fn converge_attrs(path: &Path, attrs: &Attributes, dry_run: bool) -> Result<Vec<String>, ExecuteError> {
  use std::os::unix::fs::{MetadataExt, PermissionsExt};

  let meta = tokio::fs::metadata(path)
    .await
    .map_err(|e| ExecuteError::io(path, e))?;
  let mut changes = Vec::new();

  if let Some(mode) = attrs.mode {
    let current = meta.permissions().mode() & 0o7777;
    if current != mode {
      changes.push(format!("mode {:04o} -> {:04o}", current, mode));
      if !dry_run {
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
          .await
          .map_err(|e| ExecuteError::io(path, e))?;
      }
    }
  }

  let uid = attrs.owner.as_deref().map(lookup_uid).transpose()?;
  let gid = attrs.group.as_deref().map(lookup_gid).transpose()?;

  let owner_change = uid.filter(|uid| uid.as_raw() != meta.uid());
  let group_change = gid.filter(|gid| gid.as_raw() != meta.gid());

  if let (Some(uid), Some(owner)) = (owner_change, attrs.owner.as_deref()) {
    changes.push(format!("owner {} -> {} ({})", meta.uid(), owner, uid));
  }
  if let (Some(gid), Some(group)) = (group_change, attrs.group.as_deref()) {
    changes.push(format!("group {} -> {} ({})", meta.gid(), group, gid));
  }

  if !dry_run && (owner_change.is_some() || group_change.is_some()) {
    debug!(path = %path.display(), uid = ?owner_change, gid = ?group_change, "changing ownership");
    nix::unistd::chown(path, owner_change, group_change).map_err(|e| ExecuteError::Chown {
      path: path.to_path_buf(),
      message: e.to_string(),
    })?;
  }

  Ok(changes)
}

#[cfg(windows)]
pub async fn converge_attrs(path: &Path, attrs: &Attributes, _dry_run: bool) -> Result<Vec<String>, ExecuteError> {
  if attrs != &Attributes::default() {
    tracing::warn!(path = %path.display(), "ownership and mode are not managed on this platform");
  }
  Ok(Vec::new())
}

/// Resolve a user name (or numeric uid) to a uid.
#[cfg(unix)]
pub fn lookup_uid(name: &str) -> Result<nix::unistd::Uid, ExecuteError> {
  use nix::unistd::{Uid, User};

  if let Ok(raw) = name.parse::<u32>() {
    return Ok(Uid::from_raw(raw));
  }
  match User::from_name(name) {
    Ok(Some(user)) => Ok(user.uid),
    _ => Err(ExecuteError::UnknownUser(name.to_string())),
  }
}

/// Resolve a group name (or numeric gid) to a gid.
#[cfg(unix)]
pub fn lookup_gid(name: &str) -> Result<nix::unistd::Gid, ExecuteError> {
  use nix::unistd::{Gid, Group};

  if let Ok(raw) = name.parse::<u32>() {
    return Ok(Gid::from_raw(raw));
  }
  match Group::from_name(name) {
    Ok(Some(group)) => Ok(group.gid),
    _ => Err(ExecuteError::UnknownGroup(name.to_string())),
  }
}
