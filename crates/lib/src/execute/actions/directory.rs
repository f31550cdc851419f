//! Directory resource implementation.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::execute::attrs::converge_attrs;
use crate::execute::types::{ExecuteError, Outcome};
use crate::resource::Directory;

/// Ensure a directory exists with the desired attributes.
///
/// Non-recursive directories require their parent to exist. In dry-run mode
/// the parent check is relaxed, since an earlier resource may create it.
pub async fn converge_directory(dir: &Directory, dry_run: bool) -> Result<Outcome, ExecuteError> {
  let path = &dir.path;
  let mut changes = Vec::new();

  match tokio::fs::metadata(path).await {
    Ok(meta) if meta.is_dir() => {
      debug!(path = %path.display(), "directory exists");
    }
    Ok(_) => return Err(ExecuteError::NotADirectory(path.clone())),
    Err(e) if e.kind() == ErrorKind::NotFound => {
      if dry_run {
        return Ok(Outcome::from_changes(vec!["create directory".to_string()]));
      }

      if dir.recursive {
        tokio::fs::create_dir_all(path)
          .await
          .map_err(|e| ExecuteError::io(path, e))?;
      } else {
        if let Some(parent) = missing_parent(path) {
          return Err(ExecuteError::MissingParent(parent));
        }
        tokio::fs::create_dir(path)
          .await
          .map_err(|e| ExecuteError::io(path, e))?;
      }

      info!(path = %path.display(), "created directory");
      changes.push("create directory".to_string());
    }
    Err(e) => return Err(ExecuteError::io(path, e)),
  }

  changes.extend(converge_attrs(path, &dir.attrs, dry_run).await?);
  Ok(Outcome::from_changes(changes))
}

/// Returns the parent of `path` if it does not exist.
pub(crate) fn missing_parent(path: &Path) -> Option<PathBuf> {
  path
    .parent()
    .filter(|parent| !parent.as_os_str().is_empty() && !parent.exists())
    .map(Path::to_path_buf)
}
