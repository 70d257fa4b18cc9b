//! Azure Functions Core Tools checker
//!
//! Portable install through npm into `<install_root>/bin/func`, invoked as
//! `node "<main.js>"`. Linux has no portable install and falls back to `npx`.

use super::private_install::PrivateInstaller;
use super::version::{extract_version, SupportedVersions};
use super::{CheckerContext, DepsChecker};
use crate::domain::{DependencyType, DepsInfo};
use crate::error::DepsCheckerError;
use crate::runner::CommandSpec;
use async_trait::async_trait;
use semver::Version;
use std::path::{Path, PathBuf};

const FUNC_COMMAND: &str = "func";
const NODE_COMMAND: &str = "node";
const FUNC_PACKAGE: &str = "azure-functions-core-tools@3";
const SUPPORTED: &[(&str, &str)] = &[("v3", "^3")];

pub struct FuncToolChecker {
    installer: PrivateInstaller,
    supported: SupportedVersions,
}

impl FuncToolChecker {
    pub fn new(ctx: CheckerContext) -> Self {
        Self {
            installer: PrivateInstaller::new(DependencyType::FuncCoreTools, "func", ctx),
            supported: SupportedVersions::new(SUPPORTED),
        }
    }

    fn ctx(&self) -> &CheckerContext {
        self.installer.context()
    }

    /// Command that runs the package through npx without installing it
    pub fn npx_command() -> String {
        format!("npx {}", FUNC_PACKAGE)
    }

    fn entry_script(root: &Path) -> PathBuf {
        root.join("node_modules")
            .join("azure-functions-core-tools")
            .join("lib")
            .join("main.js")
    }

    fn portable_command(entry: &Path) -> String {
        format!("{} \"{}\"", NODE_COMMAND, entry.display())
    }

    async fn version_of(&self, spec: CommandSpec) -> Option<Version> {
        let output = self.installer.probe(spec.arg("--version")).await?;
        extract_version(&output.stdout)
    }

    async fn portable_version(&self, entry: &Path) -> Option<Version> {
        self.version_of(CommandSpec::new(NODE_COMMAND).arg(entry.to_string_lossy()))
            .await
    }

    async fn valid_private_install(&self) -> Option<PathBuf> {
        let entry = self.installer.recorded_executable()?;
        let version = self.portable_version(&entry).await?;
        self.supported.matches(&version).then_some(entry)
    }

    async fn global_func_supported(&self) -> bool {
        if self.ctx().platform.find_command(FUNC_COMMAND).is_none() {
            return false;
        }
        match self.version_of(CommandSpec::new(FUNC_COMMAND)).await {
            Some(version) => {
                let supported = self.supported.matches(&version);
                if !supported {
                    self.ctx().logger.debug(&format!(
                        "global func {} is not supported, supported versions: {}",
                        version,
                        self.supported.labels().join(", ")
                    ));
                }
                supported
            }
            None => false,
        }
    }

    /// Whether the npx fallback can stand in for a native install (Linux only)
    fn npx_available(&self) -> bool {
        let platform = &self.ctx().platform;
        platform.is_linux() && platform.find_command(platform.os().npx_command()).is_some()
    }

    fn select_fallback(&self) -> Result<(), DepsCheckerError> {
        if !self.npx_available() {
            return Err(self.installer.failed(DepsCheckerError::command_not_found(
                DependencyType::FuncCoreTools,
                self.ctx().platform.os().npx_command(),
            )));
        }
        self.installer.fallback_selected(&Self::npx_command());
        Ok(())
    }

    async fn install_portable(&self) -> Result<(), DepsCheckerError> {
        let ctx = self.ctx();
        let npm = ctx.platform.os().npm_command();
        if ctx.platform.find_command(npm).is_none() {
            return Err(DepsCheckerError::command_not_found(
                DependencyType::FuncCoreTools,
                npm,
            ));
        }

        let staging = self.installer.staging()?;
        let spec = CommandSpec::new(npm).args([
            "install".to_string(),
            FUNC_PACKAGE.to_string(),
            "--prefix".to_string(),
            staging.path().to_string_lossy().into_owned(),
            "--no-audit".to_string(),
            "--no-fund".to_string(),
        ]);
        self.installer.run_install(spec).await?;

        let staged_entry = Self::entry_script(staging.path());
        let version = self
            .portable_version(&staged_entry)
            .await
            .filter(|v| self.supported.matches(v))
            .ok_or_else(|| {
                DepsCheckerError::download_or_install_failure(
                    DependencyType::FuncCoreTools,
                    format!("'{}' is not a working v3 install", staged_entry.display()),
                )
            })?;

        self.installer
            .commit(staging, &staged_entry, Some(version.to_string()))?;
        self.installer.completed(Some(&version.to_string()));
        Ok(())
    }
}

#[async_trait]
impl DepsChecker for FuncToolChecker {
    fn dependency_type(&self) -> DependencyType {
        DependencyType::FuncCoreTools
    }

    async fn is_installed(&self) -> bool {
        self.valid_private_install().await.is_some()
            || self.global_func_supported().await
            || self.npx_available()
    }

    async fn command(&self) -> String {
        if let Some(entry) = self.valid_private_install().await {
            return Self::portable_command(&entry);
        }
        if self.ctx().platform.is_linux() && !self.global_func_supported().await {
            return Self::npx_command();
        }
        FUNC_COMMAND.to_string()
    }

    async fn get_deps_info(&self) -> DepsInfo {
        let record = self.installer.load_record();
        DepsInfo::new(DependencyType::FuncCoreTools.display_name(), false)
            .with_supported_versions(self.supported.labels())
            .with_install_version(record.and_then(|r| r.version))
            .with_detail("binDir", self.installer.bin_dir().display().to_string())
            .with_detail("recordPath", self.installer.record_path().display().to_string())
    }

    async fn install(&self) -> Result<(), DepsCheckerError> {
        if self.ctx().platform.is_linux() {
            return self.select_fallback();
        }

        self.installer.started();
        self.install_portable()
            .await
            .map_err(|e| self.installer.failed(e))
    }
}
