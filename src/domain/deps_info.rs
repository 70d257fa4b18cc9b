//! Descriptive metadata reported by a dependency checker

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-dependency metadata, produced fresh on every query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepsInfo {
    /// Human readable name of the dependency
    pub name: String,
    /// Whether a native install is supported on Linux
    pub is_linux_supported: bool,
    /// The version currently detected, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_version: Option<String>,
    /// Supported version ranges in display form (e.g. `v14`, `3.1`)
    pub supported_versions: Vec<String>,
    /// Free-form diagnostic details
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, String>,
}

impl DepsInfo {
    /// Creates a new DepsInfo without a detected version or details
    pub fn new(name: impl Into<String>, is_linux_supported: bool) -> Self {
        Self {
            name: name.into(),
            is_linux_supported,
            install_version: None,
            supported_versions: Vec::new(),
            details: BTreeMap::new(),
        }
    }

    pub fn with_supported_versions<I, S>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported_versions = versions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_install_version(mut self, version: Option<String>) -> Self {
        self.install_version = version;
        self
    }

    /// Adds a diagnostic detail
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let info = DepsInfo::new("Node.js", true)
            .with_supported_versions(["v14", "v16"])
            .with_install_version(Some("16.3.0".to_string()))
            .with_detail("binFolder", "/usr/bin");

        assert_eq!(info.name, "Node.js");
        assert!(info.is_linux_supported);
        assert_eq!(info.supported_versions, vec!["v14", "v16"]);
        assert_eq!(info.install_version.as_deref(), Some("16.3.0"));
        assert_eq!(info.details.get("binFolder").map(String::as_str), Some("/usr/bin"));
    }

    #[test]
    fn test_serialize_camel_case() {
        let info = DepsInfo::new(".NET Core SDK", false).with_supported_versions(["3.1"]);
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["isLinuxSupported"], false);
        assert_eq!(json["supportedVersions"][0], "3.1");
        assert!(json.get("installVersion").is_none());
        assert!(json.get("details").is_none());
    }
}
