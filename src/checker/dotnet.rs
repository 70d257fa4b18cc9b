//! .NET SDK checker
//!
//! Installs the SDK privately with the vendor `dotnet-install` script. The
//! script is downloaded into the resource directory on first use unless a
//! custom script is configured.

use super::private_install::PrivateInstaller;
use super::record::InstallRecord;
use super::version::{extract_line_versions, SupportedVersions};
use super::{CheckerContext, DepsChecker};
use crate::domain::{DependencyType, DepsInfo};
use crate::error::DepsCheckerError;
use crate::runner::{powershell_quote, CommandSpec};
use async_trait::async_trait;
use semver::Version;
use std::path::{Path, PathBuf};

const DOTNET_COMMAND: &str = "dotnet";
const INSTALL_CHANNEL: &str = "6.0";
const SUPPORTED: &[(&str, &str)] = &[("3.1", "~3.1"), ("5.0", "~5.0"), ("6.0", "~6.0")];

const INSTALL_SCRIPT_URL_SH: &str = "https://dot.net/v1/dotnet-install.sh";
const INSTALL_SCRIPT_URL_PS1: &str = "https://dot.net/v1/dotnet-install.ps1";

pub struct DotnetChecker {
    installer: PrivateInstaller,
    supported: SupportedVersions,
}

impl DotnetChecker {
    pub fn new(ctx: CheckerContext) -> Self {
        Self {
            installer: PrivateInstaller::new(DependencyType::Dotnet, "dotnet", ctx),
            supported: SupportedVersions::new(SUPPORTED),
        }
    }

    /// Install into a custom directory instead of `<install_root>/bin/dotnet`
    fn ctx(&self) -> &CheckerContext {
        self.installer.context()
    }

    fn executable_name(&self) -> String {
        format!("{}{}", DOTNET_COMMAND, self.ctx().platform.os().exe_suffix())
    }

    /// SDK versions reported by `<dotnet> --list-sdks`
    async fn list_sdks(&self, dotnet: &str) -> Vec<Version> {
        match self
            .installer
            .probe(CommandSpec::new(dotnet).arg("--list-sdks"))
            .await
        {
            Some(output) => extract_line_versions(&output.stdout),
            None => Vec::new(),
        }
    }

    /// Highest supported SDK of `dotnet`, if any
    async fn supported_sdk(&self, dotnet: &str) -> Option<Version> {
        self.list_sdks(dotnet)
            .await
            .into_iter()
            .filter(|v| self.supported.matches(v))
            .max()
    }

    async fn valid_private_install(&self) -> Option<PathBuf> {
        let exe = self.installer.recorded_executable()?;
        self.supported_sdk(&exe.to_string_lossy()).await?;
        Some(exe)
    }

    async fn install_script(&self) -> Result<(PathBuf, Vec<(String, String)>), DepsCheckerError> {
        let ctx = self.ctx();
        if let Some(hook) = &ctx.config.custom_script {
            ctx.logger
                .debug(&format!("using custom install script {}", hook.script.display()));
            return Ok((hook.script.clone(), hook.env.clone()));
        }

        let (name, url) = if ctx.platform.is_windows() {
            ("dotnet-install.ps1", INSTALL_SCRIPT_URL_PS1)
        } else {
            ("dotnet-install.sh", INSTALL_SCRIPT_URL_SH)
        };
        let script = ctx.config.resource_dir().join(name);
        if !script.exists() {
            ctx.downloader.download(url, &script).await.map_err(|e| {
                DepsCheckerError::download_or_install_failure(DependencyType::Dotnet, e.to_string())
            })?;
        }
        Ok((script, Vec::new()))
    }

    fn install_command(&self, script: &Path, install_dir: &Path) -> CommandSpec {
        if self.ctx().platform.is_windows() {
            let command = format!(
                "& {{ [Net.ServicePointManager]::SecurityProtocol = [Net.SecurityProtocolType]::Tls12 ; & {} -InstallDir {} -Channel {} }}",
                powershell_quote(&script.to_string_lossy()),
                powershell_quote(&install_dir.to_string_lossy()),
                INSTALL_CHANNEL
            );
            CommandSpec::new("powershell.exe").args([
                "-NoProfile",
                "-ExecutionPolicy",
                "unrestricted",
                "-Command",
                command.as_str(),
            ])
        } else {
            CommandSpec::new("bash").args([
                script.to_string_lossy().into_owned(),
                "--install-dir".to_string(),
                install_dir.to_string_lossy().into_owned(),
                "--channel".to_string(),
                INSTALL_CHANNEL.to_string(),
            ])
        }
    }

    async fn install_private(&self) -> Result<(), DepsCheckerError> {
        let (script, env) = self.install_script().await?;
        let staging = self.installer.staging()?;

        let mut spec = self.install_command(&script, staging.path());
        for (key, value) in env {
            spec = spec.env(key, value);
        }
        self.installer.run_install(spec).await?;

        let staged_exe = staging.path().join(self.executable_name());
        let version = self
            .supported_sdk(&staged_exe.to_string_lossy())
            .await
            .ok_or_else(|| {
                DepsCheckerError::download_or_install_failure(
                    DependencyType::Dotnet,
                    format!(
                        "no supported SDK found in {} after install",
                        staged_exe.display()
                    ),
                )
            })?;

        self.installer
            .commit(staging, &staged_exe, Some(version.to_string()))?;
        self.installer.completed(Some(&version.to_string()));
        Ok(())
    }

    /// Absolute path and best supported SDK of the `dotnet` on the search path
    async fn global_install(&self) -> Option<(PathBuf, Version)> {
        let dotnet = self.ctx().platform.find_command(DOTNET_COMMAND)?;
        let version = self.supported_sdk(&dotnet.to_string_lossy()).await?;
        Some((dotnet, version))
    }

    /// Pin a supported global install in the record so `command()` no longer
    /// depends on the search path
    fn record_global(&self, dotnet: &Path, version: &Version) {
        let record = InstallRecord::new(dotnet).with_version(version.to_string());
        match self.installer.save_record(&record) {
            Ok(()) => self.ctx().logger.debug(&format!(
                "recorded global dotnet {} (SDK {})",
                dotnet.display(),
                version
            )),
            Err(e) => self.ctx().logger.warning(&e.to_string()),
        }
    }
}

#[async_trait]
impl DepsChecker for DotnetChecker {
    fn dependency_type(&self) -> DependencyType {
        DependencyType::Dotnet
    }

    async fn is_installed(&self) -> bool {
        self.valid_private_install().await.is_some() || self.global_install().await.is_some()
    }

    async fn command(&self) -> String {
        match self.valid_private_install().await {
            Some(exe) => exe.to_string_lossy().into_owned(),
            None => DOTNET_COMMAND.to_string(),
        }
    }

    async fn get_deps_info(&self) -> DepsInfo {
        let record = self.installer.load_record();
        DepsInfo::new(DependencyType::Dotnet.display_name(), false)
            .with_supported_versions(self.supported.labels())
            .with_install_version(record.and_then(|r| r.version))
            .with_detail("binDir", self.installer.bin_dir().display().to_string())
            .with_detail("recordPath", self.installer.record_path().display().to_string())
    }

    async fn ensure(&self) -> Result<(), DepsCheckerError> {
        if self.valid_private_install().await.is_some() {
            return Ok(());
        }
        if let Some((dotnet, version)) = self.global_install().await {
            self.record_global(&dotnet, &version);
            return Ok(());
        }
        self.install().await
    }

    async fn install(&self) -> Result<(), DepsCheckerError> {
        let ctx = self.ctx();
        if ctx.platform.is_linux() {
            return Err(self.installer.failed(DepsCheckerError::unsupported_platform(
                DependencyType::Dotnet,
                ctx.platform.os().to_string(),
            )));
        }

        self.installer.started();
        self.install_private()
            .await
            .map_err(|e| self.installer.failed(e))
    }
}
