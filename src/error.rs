//! Application error types using thiserror
//!
//! Error hierarchy:
//! - DepsCheckerError: Structured resolution failures reported per dependency
//! - RunnerError: Failures spawning or waiting for an external process
//! - DownloadError: Failures fetching install scripts and release binaries
//! - RecordError: Failures reading or writing an install record
//! - ConfigError: Invalid environment configuration

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::domain::{DependencyType, DEFAULT_HELP_LINK};

/// Resolution failure for a single dependency
///
/// These never escape `resolve()`; the manager turns them into
/// [`DependencyError`](crate::domain::DependencyError) values.
#[derive(Error, Debug)]
pub enum DepsCheckerError {
    /// The dependency cannot be installed on this platform and has no fallback
    #[error("{dependency} is not supported on {platform}")]
    UnsupportedPlatform {
        dependency: DependencyType,
        platform: String,
        help_link: String,
    },

    /// The vendor install script or package installation failed
    #[error("failed to install {dependency}: {message}")]
    DownloadOrInstallFailure {
        dependency: DependencyType,
        message: String,
        help_link: String,
    },

    /// The install record is unreadable or invalid
    #[error("install record {path} is corrupted: {message}")]
    ConfigCorrupted {
        path: PathBuf,
        message: String,
        help_link: String,
    },

    /// The detected version is below the supported range
    #[error("{dependency} version {found} is not supported, supported versions: {}", .supported.join(", "))]
    VersionTooOld {
        dependency: DependencyType,
        found: String,
        supported: Vec<String>,
        help_link: String,
    },

    /// Neither a private nor a system install could be found
    #[error("{dependency} was not found ('{command}' is not on the search path)")]
    CommandNotFound {
        dependency: DependencyType,
        command: String,
        help_link: String,
    },

    /// Building the backend binding extensions failed
    #[error("failed to install backend extensions in {path}: {message}")]
    ExtensionInstallFailure {
        path: PathBuf,
        message: String,
        help_link: String,
    },
}

/// Errors from the command runner
#[derive(Error, Debug)]
pub enum RunnerError {
    /// The program could not be spawned
    #[error("failed to execute '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The program did not finish in time and was killed
    #[error("'{command}' timed out after {}s", .timeout.as_secs())]
    Timeout { command: String, timeout: Duration },
}

/// Errors from the downloader
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Network request failed
    #[error("failed to download {url}: {message}")]
    Network { url: String, message: String },

    /// Timeout
    #[error("timeout while downloading {url}")]
    Timeout { url: String },

    /// The downloaded file could not be written
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the install record store
#[derive(Error, Debug)]
pub enum RecordError {
    /// Failed to read the record
    #[error("failed to read install record {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The record is not valid JSON for the expected shape
    #[error("failed to parse install record {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Failed to write the record
    #[error("failed to write install record {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No home directory and no install root override
    #[error("cannot determine the home directory; set {variable} to choose an install root")]
    MissingHomeDir { variable: String },

    /// An environment variable has an invalid value
    #[error("invalid value '{value}' for {variable}: {message}")]
    InvalidValue {
        variable: String,
        value: String,
        message: String,
    },
}

impl DepsCheckerError {
    /// Creates a new UnsupportedPlatform error
    pub fn unsupported_platform(dependency: DependencyType, platform: impl Into<String>) -> Self {
        DepsCheckerError::UnsupportedPlatform {
            dependency,
            platform: platform.into(),
            help_link: dependency.help_link(),
        }
    }

    /// Creates a new DownloadOrInstallFailure error
    pub fn download_or_install_failure(
        dependency: DependencyType,
        message: impl Into<String>,
    ) -> Self {
        DepsCheckerError::DownloadOrInstallFailure {
            dependency,
            message: message.into(),
            help_link: dependency.help_link(),
        }
    }

    /// Creates a new ConfigCorrupted error
    pub fn config_corrupted(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        DepsCheckerError::ConfigCorrupted {
            path: path.into(),
            message: message.into(),
            help_link: DEFAULT_HELP_LINK.to_string(),
        }
    }

    /// Creates a new VersionTooOld error
    pub fn version_too_old(
        dependency: DependencyType,
        found: impl Into<String>,
        supported: Vec<String>,
    ) -> Self {
        DepsCheckerError::VersionTooOld {
            dependency,
            found: found.into(),
            supported,
            help_link: dependency.help_link(),
        }
    }

    /// Creates a new CommandNotFound error
    pub fn command_not_found(dependency: DependencyType, command: impl Into<String>) -> Self {
        DepsCheckerError::CommandNotFound {
            dependency,
            command: command.into(),
            help_link: dependency.help_link(),
        }
    }

    /// Creates a new ExtensionInstallFailure error
    pub fn extension_install_failure(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        DepsCheckerError::ExtensionInstallFailure {
            path: path.into(),
            message: message.into(),
            help_link: DependencyType::Dotnet.help_link(),
        }
    }

    /// Stable error name used in status reports and telemetry
    pub fn name(&self) -> &'static str {
        match self {
            DepsCheckerError::UnsupportedPlatform { .. } => "UnsupportedPlatform",
            DepsCheckerError::DownloadOrInstallFailure { .. } => "DownloadOrInstallFailure",
            DepsCheckerError::ConfigCorrupted { .. } => "ConfigCorrupted",
            DepsCheckerError::VersionTooOld { .. } => "VersionTooOld",
            DepsCheckerError::CommandNotFound { .. } => "CommandNotFound",
            DepsCheckerError::ExtensionInstallFailure { .. } => "ExtensionInstallFailure",
        }
    }

    /// Help link for this error
    pub fn help_link(&self) -> &str {
        match self {
            DepsCheckerError::UnsupportedPlatform { help_link, .. }
            | DepsCheckerError::DownloadOrInstallFailure { help_link, .. }
            | DepsCheckerError::ConfigCorrupted { help_link, .. }
            | DepsCheckerError::VersionTooOld { help_link, .. }
            | DepsCheckerError::CommandNotFound { help_link, .. }
            | DepsCheckerError::ExtensionInstallFailure { help_link, .. } => help_link,
        }
    }
}

impl RunnerError {
    /// Creates a new Spawn error
    pub fn spawn(command: impl Into<String>, source: std::io::Error) -> Self {
        RunnerError::Spawn {
            command: command.into(),
            source,
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(command: impl Into<String>, timeout: Duration) -> Self {
        RunnerError::Timeout {
            command: command.into(),
            timeout,
        }
    }

    /// Returns true if the program does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, RunnerError::Spawn { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

impl DownloadError {
    /// Creates a new Network error
    pub fn network(url: impl Into<String>, message: impl Into<String>) -> Self {
        DownloadError::Network {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a new Write error
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DownloadError::Write {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_platform() {
        let err = DepsCheckerError::unsupported_platform(DependencyType::Dotnet, "Linux");
        let msg = format!("{}", err);
        assert!(msg.contains(".NET Core SDK"));
        assert!(msg.contains("Linux"));
        assert_eq!(err.name(), "UnsupportedPlatform");
    }

    #[test]
    fn test_download_or_install_failure() {
        let err = DepsCheckerError::download_or_install_failure(
            DependencyType::FuncCoreTools,
            "npm exited with code 1",
        );
        let msg = format!("{}", err);
        assert!(msg.contains("failed to install Azure Functions Core Tools"));
        assert!(msg.contains("code 1"));
        assert_eq!(err.name(), "DownloadOrInstallFailure");
        assert!(err.help_link().ends_with("#how-to-install-azure-functions-core-tools"));
    }

    #[test]
    fn test_config_corrupted() {
        let err = DepsCheckerError::config_corrupted("/home/u/.fx/dotnet.json", "expected value");
        let msg = format!("{}", err);
        assert!(msg.contains("dotnet.json"));
        assert!(msg.contains("corrupted"));
        assert_eq!(err.help_link(), DEFAULT_HELP_LINK);
    }

    #[test]
    fn test_version_too_old() {
        let err = DepsCheckerError::version_too_old(
            DependencyType::AzureNode,
            "10.24.1",
            vec!["v14".to_string(), "v16".to_string()],
        );
        let msg = format!("{}", err);
        assert!(msg.contains("10.24.1"));
        assert!(msg.contains("v14, v16"));
        assert_eq!(err.name(), "VersionTooOld");
    }

    #[test]
    fn test_command_not_found() {
        let err = DepsCheckerError::command_not_found(DependencyType::Ngrok, "ngrok");
        let msg = format!("{}", err);
        assert!(msg.contains("'ngrok' is not on the search path"));
        assert_eq!(err.name(), "CommandNotFound");
    }

    #[test]
    fn test_extension_install_failure() {
        let err = DepsCheckerError::extension_install_failure("/proj/api", "build failed");
        assert!(format!("{}", err).contains("/proj/api"));
        assert_eq!(err.name(), "ExtensionInstallFailure");
    }

    #[test]
    fn test_runner_error_timeout() {
        let err = RunnerError::timeout("bash install.sh", Duration::from_secs(300));
        let msg = format!("{}", err);
        assert!(msg.contains("timed out after 300s"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_runner_error_not_found() {
        let err = RunnerError::spawn(
            "dotnet",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        assert!(err.is_not_found());
        assert!(format!("{}", err).contains("failed to execute 'dotnet'"));
    }

    #[test]
    fn test_download_error_network() {
        let err = DownloadError::network("https://dot.net/v1/dotnet-install.sh", "HTTP 503");
        let msg = format!("{}", err);
        assert!(msg.contains("dotnet-install.sh"));
        assert!(msg.contains("HTTP 503"));
    }

    #[test]
    fn test_record_error_parse() {
        let err = RecordError::Parse {
            path: PathBuf::from("/x/bicep.json"),
            message: "EOF".to_string(),
        };
        assert!(format!("{}", err).contains("failed to parse install record"));
    }

    #[test]
    fn test_config_error_invalid_value() {
        let err = ConfigError::InvalidValue {
            variable: "DEPS_CHECKER_INSTALL_TIMEOUT_SECS".to_string(),
            value: "soon".to_string(),
            message: "expected a number of seconds".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("soon"));
        assert!(msg.contains("DEPS_CHECKER_INSTALL_TIMEOUT_SECS"));
    }

    #[test]
    fn test_error_debug_trait() {
        let err = DepsCheckerError::command_not_found(DependencyType::AzureNode, "node");
        let debug = format!("{:?}", err);
        assert!(debug.contains("CommandNotFound"));
    }
}
