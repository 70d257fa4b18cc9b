//! Bicep CLI checker, installed from the GitHub release binaries

use super::private_install::PrivateInstaller;
use super::version::{extract_version, SupportedVersions};
use super::{CheckerContext, DepsChecker};
use crate::domain::{DependencyType, DepsInfo};
use crate::error::DepsCheckerError;
use crate::platform::OsFamily;
use crate::runner::CommandSpec;
use async_trait::async_trait;
use semver::Version;
use std::path::{Path, PathBuf};

const BICEP_COMMAND: &str = "bicep";
const BICEP_RELEASE: &str = "v0.4.1008";
const RELEASE_BASE_URL: &str = "https://github.com/Azure/bicep/releases/download";
const SUPPORTED: &[(&str, &str)] = &[(">= 0.4", ">=0.4")];

pub struct BicepChecker {
    installer: PrivateInstaller,
    supported: SupportedVersions,
}

impl BicepChecker {
    pub fn new(ctx: CheckerContext) -> Self {
        Self {
            installer: PrivateInstaller::new(DependencyType::Bicep, "bicep", ctx),
            supported: SupportedVersions::new(SUPPORTED),
        }
    }

    fn ctx(&self) -> &CheckerContext {
        self.installer.context()
    }

    /// Release asset for the given OS
    fn release_url(os: OsFamily) -> String {
        let asset = match os {
            OsFamily::Windows => "bicep-win-x64.exe",
            OsFamily::MacOs => "bicep-osx-x64",
            OsFamily::Linux => "bicep-linux-x64",
        };
        format!("{}/{}/{}", RELEASE_BASE_URL, BICEP_RELEASE, asset)
    }

    async fn supported_version(&self, bicep: &str) -> Option<Version> {
        let output = self
            .installer
            .probe(CommandSpec::new(bicep).arg("--version"))
            .await?;
        extract_version(&output.stdout).filter(|v| self.supported.matches(v))
    }

    async fn install_release(&self) -> Result<(), DepsCheckerError> {
        let os = self.ctx().platform.os();
        let staging = self.installer.staging()?;
        let staged = staging
            .path()
            .join(format!("{}{}", BICEP_COMMAND, os.exe_suffix()));

        let url = Self::release_url(os);
        self.ctx()
            .downloader
            .download(&url, &staged)
            .await
            .map_err(|e| {
                DepsCheckerError::download_or_install_failure(DependencyType::Bicep, e.to_string())
            })?;
        make_executable(&staged).map_err(|e| {
            DepsCheckerError::download_or_install_failure(
                DependencyType::Bicep,
                format!("cannot make {} executable: {}", staged.display(), e),
            )
        })?;

        let version = self
            .supported_version(&staged.to_string_lossy())
            .await
            .ok_or_else(|| {
                DepsCheckerError::download_or_install_failure(
                    DependencyType::Bicep,
                    format!("'{}' does not report a supported version", staged.display()),
                )
            })?;

        self.installer
            .commit(staging, &staged, Some(version.to_string()))?;
        self.installer.completed(Some(&version.to_string()));
        Ok(())
    }

    /// Recorded binary, if it still reports a supported version
    async fn valid_private_install(&self) -> Option<PathBuf> {
        let exe = self.installer.recorded_executable()?;
        self.supported_version(&exe.to_string_lossy()).await?;
        Some(exe)
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut permissions = std::fs::metadata(path)?.permissions();
    permissions.set_mode(0o755);
    std::fs::set_permissions(path, permissions)
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[async_trait]
impl DepsChecker for BicepChecker {
    fn dependency_type(&self) -> DependencyType {
        DependencyType::Bicep
    }

    async fn is_installed(&self) -> bool {
        if self.valid_private_install().await.is_some() {
            return true;
        }
        self.ctx().platform.find_command(BICEP_COMMAND).is_some()
            && self.supported_version(BICEP_COMMAND).await.is_some()
    }

    async fn command(&self) -> String {
        self.valid_private_install()
            .await
            .map(|exe| exe.to_string_lossy().into_owned())
            .unwrap_or_else(|| BICEP_COMMAND.to_string())
    }

    async fn get_deps_info(&self) -> DepsInfo {
        let record = self.installer.load_record();
        DepsInfo::new(DependencyType::Bicep.display_name(), true)
            .with_supported_versions(self.supported.labels())
            .with_install_version(record.and_then(|r| r.version))
            .with_detail("binDir", self.installer.bin_dir().display().to_string())
            .with_detail("release", BICEP_RELEASE)
    }

    async fn install(&self) -> Result<(), DepsCheckerError> {
        self.installer.started();
        self.install_release()
            .await
            .map_err(|e| self.installer.failed(e))
    }
}
