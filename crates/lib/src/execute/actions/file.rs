//! File and template write implementation.
//!
//! Content is written through a sibling temporary file and renamed into
//! place, so readers never observe a partially written file. The staging
//! file carries its final owner and mode before the rename.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::directory::missing_parent;
use crate::consts::APP_NAME;
use crate::execute::attrs::converge_attrs;
use crate::execute::types::{ExecuteError, Outcome};
use crate::resource::{Attributes, File, FileAction};

/// Converge a file resource.
pub async fn converge_file(file: &File, dry_run: bool) -> Result<Outcome, ExecuteError> {
  match file.action {
    FileAction::Create => ensure_file(&file.path, file.content.as_deref(), &file.attrs, dry_run, false).await,
    FileAction::Delete => delete_file(&file.path, dry_run).await,
  }
}

/// Write rendered template output.
///
/// The write always happens; the outcome reports whether content or
/// attributes actually changed.
pub async fn write_rendered(
  path: &Path,
  content: &str,
  attrs: &Attributes,
  dry_run: bool,
) -> Result<Outcome, ExecuteError> {
  ensure_file(path, Some(content), attrs, dry_run, true).await
}

async fn ensure_file(
  path: &Path,
  content: Option<&str>,
  attrs: &Attributes,
  dry_run: bool,
  always_write: bool,
) -> Result<Outcome, ExecuteError> {
  let mut changes = Vec::new();

  let current = match tokio::fs::metadata(path).await {
    Ok(meta) if meta.is_file() => Some(meta),
    Ok(_) => return Err(ExecuteError::NotAFile(path.to_path_buf())),
    Err(e) if e.kind() == ErrorKind::NotFound => None,
    Err(e) => return Err(ExecuteError::io(path, e)),
  };

  if current.is_none() && !dry_run {
    if let Some(parent) = missing_parent(path) {
      return Err(ExecuteError::MissingParent(parent));
    }
  }

  match (current.is_some(), content) {
    (false, desired) => {
      changes.push("create file".to_string());
      if dry_run {
        return Ok(Outcome::from_changes(changes));
      }
      write_atomic(path, desired.unwrap_or_default(), attrs).await?;
      info!(path = %path.display(), "created file");
    }
    (true, Some(desired)) => {
      let existing = tokio::fs::read(path).await.map_err(|e| ExecuteError::io(path, e))?;
      let differs = existing != desired.as_bytes();
      if differs {
        changes.push("update content".to_string());
      }
      if !dry_run && (differs || always_write) {
        write_atomic(path, desired, attrs).await?;
        debug!(path = %path.display(), changed = differs, "wrote file");
      }
    }
    (true, None) => {}
  }

  changes.extend(converge_attrs(path, attrs, dry_run).await?);
  Ok(Outcome::from_changes(changes))
}

async fn delete_file(path: &Path, dry_run: bool) -> Result<Outcome, ExecuteError> {
  match tokio::fs::symlink_metadata(path).await {
    Ok(meta) if meta.is_dir() => Err(ExecuteError::NotAFile(path.to_path_buf())),
    Ok(_) => {
      if !dry_run {
        tokio::fs::remove_file(path)
          .await
          .map_err(|e| ExecuteError::io(path, e))?;
        info!(path = %path.display(), "deleted file");
      }
      Ok(Outcome::from_changes(vec!["delete file".to_string()]))
    }
    Err(e) if e.kind() == ErrorKind::NotFound => {
      debug!(path = %path.display(), "file already absent");
      Ok(Outcome::UpToDate)
    }
    Err(e) => Err(ExecuteError::io(path, e)),
  }
}

/// Mode for new files that declare none.
#[cfg(unix)]
const PRIVATE_MODE: u32 = 0o600;

/// Replace `path` with `content` via a temporary sibling and rename.
///
/// A replacement keeps the existing file's owner, group and mode; a new file
/// gets the owner, group and mode from `attrs`.
pub(crate) async fn write_atomic(path: &Path, content: &str, attrs: &Attributes) -> Result<(), ExecuteError> {
  let staging = staging_path(path);
  let existing = tokio::fs::metadata(path).await.ok();

  let result = match stage(&staging, content, attrs, existing.as_ref()).await {
    Ok(()) => tokio::fs::rename(&staging, path)
      .await
      .map_err(|e| ExecuteError::io(path, e)),
    Err(e) => Err(e),
  };
  if result.is_err() {
    let _ = tokio::fs::remove_file(&staging).await;
  }
  result
}

#[cfg(unix)]
async fn stage(
  staging: &Path,
  content: &str,
  attrs: &Attributes,
  existing: Option<&std::fs::Metadata>,
) -> Result<(), ExecuteError> {
  use std::os::unix::fs::{MetadataExt, PermissionsExt};

  use nix::unistd::{Gid, Uid};
  use tokio::io::AsyncWriteExt;

  use crate::execute::attrs::{lookup_gid, lookup_uid};

  let (mode, uid, gid) = match existing {
    Some(meta) => (meta.permissions().mode() & 0o7777, Some(meta.uid()), Some(meta.gid())),
    None => (
      attrs.mode.unwrap_or(PRIVATE_MODE),
      attrs.owner.as_deref().map(lookup_uid).transpose()?.map(Uid::as_raw),
      attrs.group.as_deref().map(lookup_gid).transpose()?.map(Gid::as_raw),
    ),
  };

  match tokio::fs::remove_file(staging).await {
    Ok(()) => debug!(path = %staging.display(), "removed stale staging file"),
    Err(e) if e.kind() == ErrorKind::NotFound => {}
    Err(e) => return Err(ExecuteError::io(staging, e)),
  }

  // Owner-only until ownership is settled.
  let mut file = tokio::fs::OpenOptions::new()
    .write(true)
    .create_new(true)
    .mode(mode & 0o700)
    .open(staging)
    .await
    .map_err(|e| ExecuteError::io(staging, e))?;
  file
    .write_all(content.as_bytes())
    .await
    .map_err(|e| ExecuteError::io(staging, e))?;
  file.sync_all().await.map_err(|e| ExecuteError::io(staging, e))?;
  let staged = file.metadata().await.map_err(|e| ExecuteError::io(staging, e))?;
  drop(file);

  let uid = uid.filter(|uid| *uid != staged.uid()).map(Uid::from_raw);
  let gid = gid.filter(|gid| *gid != staged.gid()).map(Gid::from_raw);
  if uid.is_some() || gid.is_some() {
    nix::unistd::chown(staging, uid, gid).map_err(|e| ExecuteError::Chown {
      path: staging.to_path_buf(),
      message: e.to_string(),
    })?;
  }

  tokio::fs::set_permissions(staging, std::fs::Permissions::from_mode(mode))
    .await
    .map_err(|e| ExecuteError::io(staging, e))
}

#[cfg(windows)]
async fn stage(
  staging: &Path,
  content: &str,
  _attrs: &Attributes,
  existing: Option<&std::fs::Metadata>,
) -> Result<(), ExecuteError> {
  tokio::fs::write(staging, content)
    .await
    .map_err(|e| ExecuteError::io(staging, e))?;
  if let Some(meta) = existing {
    tokio::fs::set_permissions(staging, meta.permissions())
      .await
      .map_err(|e| ExecuteError::io(staging, e))?;
  }
  Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
  let file_name = path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_default();
  path.with_file_name(format!(".{}.{}-new", file_name, APP_NAME))
}
