//! ngrok checker, installed privately from the `ngrok` npm package

use super::private_install::PrivateInstaller;
use super::version::extract_version;
use super::{CheckerContext, DepsChecker};
use crate::domain::{DependencyType, DepsInfo};
use crate::error::DepsCheckerError;
use crate::runner::CommandSpec;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

const NGROK_COMMAND: &str = "ngrok";
const NGROK_PACKAGE: &str = "ngrok@4";

pub struct NgrokChecker {
    installer: PrivateInstaller,
}

impl NgrokChecker {
    pub fn new(ctx: CheckerContext) -> Self {
        Self {
            installer: PrivateInstaller::new(DependencyType::Ngrok, "ngrok", ctx),
        }
    }

    fn ctx(&self) -> &CheckerContext {
        self.installer.context()
    }

    fn binary_path(&self, root: &Path) -> PathBuf {
        root.join("node_modules")
            .join("ngrok")
            .join("bin")
            .join(format!("{}{}", NGROK_COMMAND, self.ctx().platform.os().exe_suffix()))
    }

    /// `ngrok version` output, when the binary works at all
    async fn probe_version(&self, ngrok: &str) -> Option<String> {
        let output = self
            .installer
            .probe(CommandSpec::new(ngrok).arg("version"))
            .await?;
        Some(
            extract_version(&output.stdout)
                .map(|v| v.to_string())
                .unwrap_or_else(|| output.stdout.trim().to_string()),
        )
    }

    async fn install_package(&self) -> Result<(), DepsCheckerError> {
        let ctx = self.ctx();
        let npm = ctx.platform.os().npm_command();
        if ctx.platform.find_command(npm).is_none() {
            return Err(DepsCheckerError::command_not_found(DependencyType::Ngrok, npm));
        }

        let staging = self.installer.staging()?;
        let spec = CommandSpec::new(npm).args([
            "install".to_string(),
            NGROK_PACKAGE.to_string(),
            "--prefix".to_string(),
            staging.path().to_string_lossy().into_owned(),
            "--no-audit".to_string(),
            "--no-fund".to_string(),
        ]);
        self.installer.run_install(spec).await?;

        let staged = self.binary_path(staging.path());
        let version = self
            .probe_version(&staged.to_string_lossy())
            .await
            .ok_or_else(|| {
                DepsCheckerError::download_or_install_failure(
                    DependencyType::Ngrok,
                    format!("'{}' does not run after install", staged.display()),
                )
            })?;

        self.installer
            .commit(staging, &staged, Some(version.clone()))?;
        self.installer.completed(Some(&version));
        Ok(())
    }

    /// Recorded binary, if it still runs
    async fn valid_private_install(&self) -> Option<PathBuf> {
        let exe = self.installer.recorded_executable()?;
        self.probe_version(&exe.to_string_lossy()).await?;
        Some(exe)
    }
}

#[async_trait]
impl DepsChecker for NgrokChecker {
    fn dependency_type(&self) -> DependencyType {
        DependencyType::Ngrok
    }

    async fn is_installed(&self) -> bool {
        if self.valid_private_install().await.is_some() {
            return true;
        }
        self.ctx().platform.find_command(NGROK_COMMAND).is_some()
            && self.probe_version(NGROK_COMMAND).await.is_some()
    }

    async fn command(&self) -> String {
        self.valid_private_install()
            .await
            .map(|exe| exe.to_string_lossy().into_owned())
            .unwrap_or_else(|| NGROK_COMMAND.to_string())
    }

    async fn get_deps_info(&self) -> DepsInfo {
        let record = self.installer.load_record();
        DepsInfo::new(DependencyType::Ngrok.display_name(), true)
            .with_supported_versions(["2.x", "3.x"])
            .with_install_version(record.and_then(|r| r.version))
            .with_detail("binDir", self.installer.bin_dir().display().to_string())
            .with_detail("package", NGROK_PACKAGE)
    }

    async fn install(&self) -> Result<(), DepsCheckerError> {
        self.installer.started();
        self.install_package()
            .await
            .map_err(|e| self.installer.failed(e))
    }
}

#[cfg(test)]
mod tests {
    use super::super::record::InstallRecord;
    use super::super::testing::*;
    use super::*;
    use crate::platform::OsFamily;
    use crate::runner::CommandOutput;
    use std::fs;

    fn npm_runner() -> FakeRunner {
        FakeRunner::new()
            .on(|spec| {
                (spec.program == "npm").then(|| {
                    let bin = Path::new(&spec.args[3]).join("node_modules/ngrok/bin");
                    fs::create_dir_all(&bin).unwrap();
                    fs::write(bin.join("ngrok"), "").unwrap();
                    CommandOutput::new(0, "", "")
                })
            })
            .on(|spec| {
                (spec.args == ["version"] && Path::new(&spec.program).exists())
                    .then(|| CommandOutput::new(0, "ngrok version 2.3.40\n", ""))
            })
    }

    #[tokio::test]
    async fn test_install_on_linux() {
        let h = harness(FakePlatform::new(OsFamily::Linux).with_command("npm"), npm_runner());
        let checker = NgrokChecker::new(h.ctx.clone());

        assert!(!checker.is_installed().await);
        assert!(checker.resolve().await);
        assert!(checker.is_installed().await);

        let command = PathBuf::from(checker.command().await);
        assert!(command.starts_with(h.root.path().join("bin")));
        assert!(command.ends_with("node_modules/ngrok/bin/ngrok"));
        assert_eq!(install_count(&h), 1);

        let info = checker.get_deps_info().await;
        assert_eq!(info.install_version.as_deref(), Some("2.3.40"));
    }

    #[tokio::test]
    async fn test_global_ngrok() {
        let runner = FakeRunner::new()
            .on(|spec| (spec.program == "ngrok").then(|| CommandOutput::new(0, "ngrok version 3.1.0", "")));
        let h = harness(FakePlatform::new(OsFamily::MacOs).with_command("ngrok"), runner);
        let checker = NgrokChecker::new(h.ctx.clone());

        assert!(checker.is_installed().await);
        assert_eq!(checker.command().await, "ngrok");
    }

    #[tokio::test]
    async fn test_npm_failure() {
        let runner = FakeRunner::new()
            .on(|spec| (spec.program == "npm").then(|| CommandOutput::new(1, "", "ETIMEDOUT")));
        let h = harness(FakePlatform::new(OsFamily::MacOs).with_command("npm"), runner);

        let err = NgrokChecker::new(h.ctx.clone()).ensure().await.unwrap_err();
        assert_eq!(err.name(), "DownloadOrInstallFailure");
        assert!(err.to_string().contains("ETIMEDOUT"));
        assert!(!h.root.path().join("ngrok.json").exists());
    }

    #[tokio::test]
    async fn test_record_with_broken_binary_is_not_the_command() {
        let runner = FakeRunner::new()
            .on(|spec| (spec.args == ["version"]).then(|| CommandOutput::new(1, "", "exec format error")));
        let h = harness(FakePlatform::new(OsFamily::MacOs), runner);
        let broken = h.root.path().join("old").join("ngrok");
        fs::create_dir_all(broken.parent().unwrap()).unwrap();
        fs::write(&broken, "").unwrap();
        InstallRecord::new(&broken)
            .save(&h.root.path().join("ngrok.json"))
            .unwrap();

        let checker = NgrokChecker::new(h.ctx.clone());
        assert!(!checker.is_installed().await);
        assert!(!checker.resolve().await);
        assert_eq!(checker.command().await, "ngrok");
    }
}
