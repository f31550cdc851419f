//! Execute resource implementation.
//!
//! Commands run through the system shell with the caller's environment,
//! extended by the resource's own variables. On unix a resource may name a
//! user and group to run as.

use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info};

use crate::execute::types::ExecuteError;
use crate::resource::Execute;

/// Run an execute resource's command.
///
/// A command still running after `timeout` is killed and reported as
/// [`ExecuteError::Timeout`].
///
/// # Returns
///
/// The trimmed stdout of the command on success.
pub async fn execute_cmd(
  exec: &Execute,
  shell: Option<&str>,
  timeout: Option<Duration>,
) -> Result<String, ExecuteError> {
  info!(cmd = %exec.command, "executing command");

  let (shell_cmd, shell_args) = get_shell(shell);

  let mut command = Command::new(&shell_cmd);
  command.args(&shell_args).arg(&exec.command).envs(&exec.env);

  if let Some(cwd) = &exec.cwd {
    command.current_dir(cwd);
  }

  #[cfg(unix)]
  apply_credentials(&mut command, exec)?;

  debug!(shell = %shell_cmd, cwd = ?exec.cwd, "spawning process");

  command.kill_on_drop(true);
  let output = match timeout {
    Some(limit) => tokio::time::timeout(limit, command.output())
      .await
      .map_err(|_| ExecuteError::Timeout {
        cmd: exec.command.clone(),
        timeout: limit,
      })?,
    None => command.output().await,
  }
  .map_err(|e| ExecuteError::Spawn {
    cmd: exec.command.clone(),
    source: e,
  })?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    if !stderr.is_empty() {
      debug!(stderr = %stderr, "command stderr");
    }
    if !stdout.is_empty() {
      debug!(stdout = %stdout, "command stdout");
    }

    return Err(ExecuteError::CmdFailed {
      cmd: exec.command.clone(),
      code: output.status.code(),
    });
  }

  let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();

  if !stdout.is_empty() {
    debug!(stdout = %stdout, "command output");
  }

  Ok(stdout)
}

/// Switch to the resource's user/group when they differ from the current process.
#[cfg(unix)]
fn apply_credentials(command: &mut Command, exec: &Execute) -> Result<(), ExecuteError> {
  use crate::execute::attrs::{lookup_gid, lookup_uid};
  use nix::unistd::{getegid, geteuid};

  if let Some(group) = exec.group.as_deref() {
    let gid = lookup_gid(group)?;
    if gid != getegid() {
      command.gid(gid.as_raw());
    }
  }
  if let Some(user) = exec.user.as_deref() {
    let uid = lookup_uid(user)?;
    if uid != geteuid() {
      command.uid(uid.as_raw());
    }
  }
  Ok(())
}

/// Get the shell command and arguments for the current platform.
///
/// An override is inspected to pick the matching argument style; otherwise
/// `/bin/sh -c` (Unix) or PowerShell (Windows) is used. `$SHELL` is ignored
/// so profile files cannot change what a resource sees.
fn get_shell(override_shell: Option<&str>) -> (String, Vec<String>) {
  if let Some(shell) = override_shell {
    let args = if shell.contains("powershell") || shell.contains("pwsh") {
      vec!["-NoProfile".to_string(), "-Command".to_string()]
    } else if shell.contains("cmd") {
      vec!["/C".to_string()]
    } else {
      vec!["-c".to_string()]
    };
    return (shell.to_string(), args);
  }

  #[cfg(unix)]
  {
    ("/bin/sh".to_string(), vec!["-c".to_string()])
  }

  #[cfg(windows)]
  {
    (
      "powershell.exe".to_string(),
      vec![
        "-NoProfile".to_string(),
        "-ExecutionPolicy".to_string(),
        "Bypass".to_string(),
        "-Command".to_string(),
      ],
    )
  }
}
