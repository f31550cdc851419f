use std::fmt;
use std::path::Path;

/// Distribution families with distinct web-server layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformFamily {
  /// Debian and Ubuntu
  Debian,
  Fedora,
  /// Red Hat and CentOS
  RedHat,
  Other,
}

impl PlatformFamily {
  /// Map a platform name (e.g. `ubuntu`, `centos`) to its family.
  pub fn from_platform(name: &str) -> Self {
    match name.trim().to_ascii_lowercase().as_str() {
      "ubuntu" | "debian" => Self::Debian,
      "fedora" => Self::Fedora,
      "redhat" | "rhel" | "centos" => Self::RedHat,
      _ => Self::Other,
    }
  }

  /// Detect the family of the running system from `/etc/os-release`.
  pub fn detect() -> Self {
    Self::detect_from(Path::new("/etc/os-release"))
  }

  pub fn detect_from(os_release: &Path) -> Self {
    std::fs::read_to_string(os_release)
      .ok()
      .and_then(|content| os_release_id(&content))
      .map(|id| Self::from_platform(&id))
      .unwrap_or(Self::Other)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Debian => "debian",
      Self::Fedora => "fedora",
      Self::RedHat => "redhat",
      Self::Other => "other",
    }
  }

  /// Web-server vhost directory relative to the web-server config dir.
  ///
  /// `None` means vhost files live directly in the config dir.
  pub fn vhost_subdir(&self) -> Option<&'static str> {
    match self {
      Self::Debian => Some("sites-enabled"),
      Self::Fedora => Some("vhost.d"),
      Self::RedHat => Some("conf.d"),
      Self::Other => None,
    }
  }
}

impl fmt::Display for PlatformFamily {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Extract the `ID=` value from os-release content.
fn os_release_id(content: &str) -> Option<String> {
  content
    .lines()
    .find_map(|line| line.strip_prefix("ID="))
    .map(|value| value.trim().trim_matches('"').to_string())
}
