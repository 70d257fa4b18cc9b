//! Platform detection for install decisions
//!
//! Reports the OS family, the user's home directory, whether system-wide
//! install locations are writable, and where a command lives on the search path.

use std::fmt;
use std::path::{Path, PathBuf};

/// Operating system family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsFamily {
    Windows,
    MacOs,
    Linux,
}

impl OsFamily {
    /// Detect the OS family of the running process
    ///
    /// Unix flavours other than macOS are treated as Linux.
    pub fn current() -> Self {
        match std::env::consts::OS {
            "windows" => OsFamily::Windows,
            "macos" => OsFamily::MacOs,
            _ => OsFamily::Linux,
        }
    }

    /// Suffix of executables on this platform
    pub fn exe_suffix(&self) -> &'static str {
        match self {
            OsFamily::Windows => ".exe",
            _ => "",
        }
    }

    /// Name of the npm launcher on this platform
    pub fn npm_command(&self) -> &'static str {
        match self {
            OsFamily::Windows => "npm.cmd",
            _ => "npm",
        }
    }

    /// Name of the npx launcher on this platform
    pub fn npx_command(&self) -> &'static str {
        match self {
            OsFamily::Windows => "npx.cmd",
            _ => "npx",
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OsFamily::Windows => "Windows",
            OsFamily::MacOs => "macOS",
            OsFamily::Linux => "Linux",
        };
        write!(f, "{}", name)
    }
}

/// Trait for probing the host platform
pub trait Platform: Send + Sync {
    /// The OS family
    fn os(&self) -> OsFamily;

    /// The current user's home directory
    fn home_dir(&self) -> Option<PathBuf>;

    /// Whether the current user can write to system-wide install locations
    fn can_write_system_dirs(&self) -> bool;

    /// Resolve a command on the search path
    fn find_command(&self, command: &str) -> Option<PathBuf>;

    fn is_linux(&self) -> bool {
        self.os() == OsFamily::Linux
    }

    fn is_windows(&self) -> bool {
        self.os() == OsFamily::Windows
    }
}

/// Platform probe for the machine the process runs on
#[derive(Debug, Default)]
pub struct SystemPlatform;

impl SystemPlatform {
    pub fn new() -> Self {
        Self
    }

    fn system_install_dir(&self) -> PathBuf {
        match self.os() {
            OsFamily::Windows => std::env::var_os("ProgramFiles")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("C:\\Program Files")),
            _ => PathBuf::from("/usr/local/bin"),
        }
    }
}

impl Platform for SystemPlatform {
    fn os(&self) -> OsFamily {
        OsFamily::current()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }

    fn can_write_system_dirs(&self) -> bool {
        is_dir_writable(&self.system_install_dir())
    }

    fn find_command(&self, command: &str) -> Option<PathBuf> {
        which::which(command).ok()
    }
}

/// Check whether a file can be created in `dir`
pub fn is_dir_writable(dir: &Path) -> bool {
    dir.is_dir() && tempfile::NamedTempFile::new_in(dir).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_family_current() {
        let os = OsFamily::current();
        if cfg!(windows) {
            assert_eq!(os, OsFamily::Windows);
        } else if cfg!(target_os = "macos") {
            assert_eq!(os, OsFamily::MacOs);
        } else {
            assert_eq!(os, OsFamily::Linux);
        }
    }

    #[test]
    fn test_exe_suffix() {
        assert_eq!(OsFamily::Windows.exe_suffix(), ".exe");
        assert_eq!(OsFamily::Linux.exe_suffix(), "");
        assert_eq!(OsFamily::MacOs.exe_suffix(), "");
    }

    #[test]
    fn test_npm_commands() {
        assert_eq!(OsFamily::Windows.npm_command(), "npm.cmd");
        assert_eq!(OsFamily::MacOs.npm_command(), "npm");
        assert_eq!(OsFamily::Windows.npx_command(), "npx.cmd");
        assert_eq!(OsFamily::Linux.npx_command(), "npx");
    }

    #[test]
    fn test_display() {
        assert_eq!(OsFamily::MacOs.to_string(), "macOS");
        assert_eq!(OsFamily::Linux.to_string(), "Linux");
    }

    #[test]
    fn test_is_dir_writable() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(is_dir_writable(temp_dir.path()));
        assert!(!is_dir_writable(&temp_dir.path().join("missing")));
    }

    #[test]
    fn test_system_platform_find_missing_command() {
        let platform = SystemPlatform::new();
        assert!(platform
            .find_command("depcheck-definitely-not-a-real-program")
            .is_none());
    }
}
