//! Persisted install records (`<install_root>/<dependency>.json`)

use crate::atomic;
use crate::error::RecordError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Where a private install put its executable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallRecord {
    /// Absolute path of the installed executable (or entry script)
    #[serde(alias = "dotnetExecutablePath")]
    pub executable_path: PathBuf,
    /// Version detected right after the install
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl InstallRecord {
    pub fn new(executable_path: impl Into<PathBuf>) -> Self {
        Self {
            executable_path: executable_path.into(),
            version: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Load a record, `Ok(None)` when the file does not exist
    pub fn load(path: &Path) -> Result<Option<Self>, RecordError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(RecordError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| RecordError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }

    /// Atomically write the record
    pub fn save(&self, path: &Path) -> Result<(), RecordError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| RecordError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        atomic::write_file(path, json.as_bytes()).map_err(|source| RecordError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
