//! Resolution outcome for a single dependency

use super::{DependencyType, DepsInfo};
use crate::error::DepsCheckerError;
use serde::{Deserialize, Serialize};

/// Structured error attached to a failed resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyError {
    /// Stable error name (e.g. `DownloadOrInstallFailure`)
    pub name: String,
    /// Human readable message
    pub message: String,
    /// Where the user can read more
    pub help_link: String,
}

impl From<&DepsCheckerError> for DependencyError {
    fn from(error: &DepsCheckerError) -> Self {
        Self {
            name: error.name().to_string(),
            message: error.to_string(),
            help_link: error.help_link().to_string(),
        }
    }
}

/// Details derived from the checker's [`DepsInfo`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusDetails {
    pub is_linux_supported: bool,
    pub supported_versions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_version: Option<String>,
    pub help_link: String,
}

/// Outward-facing result of resolving one dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyStatus {
    /// Which dependency this status describes
    pub name: DependencyType,
    /// Whether the dependency is usable after resolution
    pub is_installed: bool,
    /// Command or path to invoke the dependency
    pub command: String,
    /// Metadata about the dependency
    pub details: StatusDetails,
    /// Present when resolution failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<DependencyError>,
}

impl DependencyStatus {
    /// Creates a status from a checker's metadata and resolution outcome
    pub fn new(
        name: DependencyType,
        command: impl Into<String>,
        info: DepsInfo,
        outcome: Result<(), &DepsCheckerError>,
    ) -> Self {
        let details = StatusDetails {
            is_linux_supported: info.is_linux_supported,
            supported_versions: info.supported_versions,
            install_version: info.install_version,
            help_link: name.help_link(),
        };
        Self {
            name,
            is_installed: outcome.is_ok(),
            command: command.into(),
            details,
            error: outcome.err().map(DependencyError::from),
        }
    }

    /// Returns true if resolution failed
    pub fn is_failure(&self) -> bool {
        self.error.is_some() || !self.is_installed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> DepsInfo {
        DepsInfo::new(".NET Core SDK", false).with_supported_versions(["3.1", "6.0"])
    }

    #[test]
    fn test_success_status() {
        let status = DependencyStatus::new(DependencyType::Dotnet, "dotnet", info(), Ok(()));
        assert!(status.is_installed);
        assert!(status.error.is_none());
        assert!(!status.is_failure());
        assert_eq!(status.details.supported_versions, vec!["3.1", "6.0"]);
    }

    #[test]
    fn test_failure_status_carries_error() {
        let err = DepsCheckerError::download_or_install_failure(
            DependencyType::Dotnet,
            "install script exited with code 1",
        );
        let status = DependencyStatus::new(DependencyType::Dotnet, "dotnet", info(), Err(&err));

        assert!(!status.is_installed);
        assert!(status.is_failure());
        let error = status.error.unwrap();
        assert_eq!(error.name, "DownloadOrInstallFailure");
        assert!(error.message.contains("exited with code 1"));
        assert!(error.help_link.contains("net-core-sdk"));
    }

    #[test]
    fn test_serialize_camel_case() {
        let status = DependencyStatus::new(DependencyType::AzureNode, "node", info(), Ok(()));
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["name"], "azure-node");
        assert_eq!(json["isInstalled"], true);
        assert_eq!(json["details"]["isLinuxSupported"], false);
        assert!(json.get("error").is_none());
    }
}
