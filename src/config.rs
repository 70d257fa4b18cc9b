//! Install locations and environment overrides
//!
//! Everything the checkers write lives under one install root, `~/.fx` by default:
//! - `<root>/bin/<tool>/` holds privately installed binaries
//! - `<root>/<dependency>.json` holds the install record of each dependency
//! - `<root>/resource/` caches downloaded vendor install scripts

use crate::domain::DependencyType;
use crate::error::ConfigError;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the per-user config folder under the home directory
pub const CONFIG_FOLDER_NAME: &str = ".fx";

/// Overrides the install root
pub const ENV_HOME: &str = "DEPS_CHECKER_HOME";
/// Timeout in seconds for install scripts and package installs
pub const ENV_INSTALL_TIMEOUT: &str = "DEPS_CHECKER_INSTALL_TIMEOUT_SECS";
/// Timeout in seconds for version probes
pub const ENV_PROBE_TIMEOUT: &str = "DEPS_CHECKER_PROBE_TIMEOUT_SECS";
/// Replaces the vendor install script with a custom one (tests only)
pub const ENV_CUSTOM_SCRIPT: &str = "DEPS_CHECKER_CUSTOM_INSTALL_SCRIPT";
/// Variables forwarded unchanged to a custom install script
pub const CUSTOM_SCRIPT_PASSTHROUGH: &[&str] = &[
    "ENV_CHECKER_CUSTOM_SCRIPT_STDOUT",
    "ENV_CHECKER_CUSTOM_SCRIPT_STDERR",
    "ENV_CHECKER_CUSTOM_SCRIPT_EXITCODE",
];

const DEFAULT_INSTALL_TIMEOUT: Duration = Duration::from_secs(5 * 60);
const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// A custom install script injected through the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomScriptHook {
    /// Script to run instead of the vendor script
    pub script: PathBuf,
    /// Environment forwarded to the script
    pub env: Vec<(String, String)>,
}

/// Checker configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepsConfig {
    /// Root of all private installs and records
    pub install_root: PathBuf,
    /// Timeout for install scripts and package installs
    pub install_timeout: Duration,
    /// Timeout for version probes
    pub probe_timeout: Duration,
    /// Custom install script, when configured
    pub custom_script: Option<CustomScriptHook>,
}

impl DepsConfig {
    /// Create a configuration rooted at `install_root` with default timeouts
    pub fn new(install_root: impl Into<PathBuf>) -> Self {
        Self {
            install_root: install_root.into(),
            install_timeout: DEFAULT_INSTALL_TIMEOUT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            custom_script: None,
        }
    }

    /// Build the configuration from the process environment
    pub fn from_env(home_dir: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_lookup(home_dir, |key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(home_dir: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let install_root = match non_empty(lookup(ENV_HOME)) {
            Some(root) => PathBuf::from(root),
            None => home_dir
                .map(|home| home.join(CONFIG_FOLDER_NAME))
                .ok_or_else(|| ConfigError::MissingHomeDir {
                    variable: ENV_HOME.to_string(),
                })?,
        };

        let mut config = Self::new(install_root);

        if let Some(value) = non_empty(lookup(ENV_INSTALL_TIMEOUT)) {
            config.install_timeout = parse_secs(ENV_INSTALL_TIMEOUT, &value)?;
        }
        if let Some(value) = non_empty(lookup(ENV_PROBE_TIMEOUT)) {
            config.probe_timeout = parse_secs(ENV_PROBE_TIMEOUT, &value)?;
        }
        if let Some(script) = non_empty(lookup(ENV_CUSTOM_SCRIPT)) {
            let env = CUSTOM_SCRIPT_PASSTHROUGH
                .iter()
                .filter_map(|key| lookup(key).map(|value| (key.to_string(), value)))
                .collect();
            config.custom_script = Some(CustomScriptHook {
                script: PathBuf::from(script),
                env,
            });
        }

        Ok(config)
    }

    pub fn with_custom_script(mut self, hook: CustomScriptHook) -> Self {
        self.custom_script = Some(hook);
        self
    }

    pub fn with_install_timeout(mut self, timeout: Duration) -> Self {
        self.install_timeout = timeout;
        self
    }

    /// Directory holding the private install of `tool`
    pub fn bin_dir(&self, tool: &str) -> PathBuf {
        self.install_root.join("bin").join(tool)
    }

    /// Path of the install record for a dependency
    pub fn record_path(&self, dependency: DependencyType) -> PathBuf {
        self.install_root.join(format!("{}.json", dependency.id()))
    }

    /// Directory caching downloaded install scripts
    pub fn resource_dir(&self) -> PathBuf {
        self.install_root.join("resource")
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_secs(variable: &str, value: &str) -> Result<Duration, ConfigError> {
    let secs: u64 = value.parse().map_err(|_| ConfigError::InvalidValue {
        variable: variable.to_string(),
        value: value.to_string(),
        message: "expected a number of seconds".to_string(),
    })?;
    if secs == 0 {
        return Err(ConfigError::InvalidValue {
            variable: variable.to_string(),
            value: value.to_string(),
            message: "timeout must be greater than zero".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}
