//! Test utilities for idconverge-lib.
//!
//! Cross-platform helpers for tests that need to run shell commands.

/// Command that prints an environment variable.
#[cfg(unix)]
pub fn echo_env(var: &str) -> String {
  format!("echo \"${}\"", var)
}

#[cfg(windows)]
pub fn echo_env(var: &str) -> String {
  format!("Write-Output $env:{}", var)
}

/// Command that creates an empty file relative to the working directory.
#[cfg(unix)]
pub fn touch_cmd(filename: &str) -> String {
  format!("touch '{}'", filename)
}

#[cfg(windows)]
pub fn touch_cmd(filename: &str) -> String {
  format!("New-Item -ItemType File -Path '{}' -Force | Out-Null", filename)
}

/// Command that appends a line to a file relative to the working directory.
#[cfg(unix)]
pub fn append_cmd(filename: &str, line: &str) -> String {
  format!("echo '{}' >> '{}'", line, filename)
}

#[cfg(windows)]
pub fn append_cmd(filename: &str, line: &str) -> String {
  format!("Add-Content -Path '{}' -Value '{}'", filename, line)
}
