//! Shared plumbing for user-scoped installs under `<install_root>/bin/<tool>`

use super::record::InstallRecord;
use super::CheckerContext;
use crate::atomic;
use crate::domain::DependencyType;
use crate::error::{DepsCheckerError, RecordError};
use crate::runner::{CommandOutput, CommandSpec};
use crate::telemetry::{properties, DepsCheckerEvent, Properties};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Private install helper owned by each checker that can install itself
///
/// Every install lands in its own `<install_root>/bin/<tool>-<random>`
/// directory. Writing the install record is the commit point; the directory
/// of the previous install is removed only afterwards, so a concurrent run
/// always sees either the old or the new install through the record.
#[derive(Clone)]
pub struct PrivateInstaller {
    dependency: DependencyType,
    tool: String,
    ctx: CheckerContext,
    bin_dir: PathBuf,
}

impl PrivateInstaller {
    pub fn new(dependency: DependencyType, tool: &str, ctx: CheckerContext) -> Self {
        let bin_dir = ctx.config.install_root.join("bin");
        Self {
            dependency,
            tool: tool.to_string(),
            ctx,
            bin_dir,
        }
    }

    /// Directory holding every private install
    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }

    pub fn record_path(&self) -> PathBuf {
        self.ctx.config.record_path(self.dependency)
    }

    pub fn context(&self) -> &CheckerContext {
        &self.ctx
    }

    /// Load the install record
    ///
    /// An unreadable or invalid record is reported as `ConfigCorrupted` through
    /// the logger and treated as absent.
    pub fn load_record(&self) -> Option<InstallRecord> {
        let path = self.record_path();
        match InstallRecord::load(&path) {
            Ok(record) => record,
            Err(e) => {
                let message = match e {
                    RecordError::Parse { message, .. } => message,
                    other => other.to_string(),
                };
                let err = DepsCheckerError::config_corrupted(&path, message);
                self.ctx.logger.warning(&err.to_string());
                None
            }
        }
    }

    /// Recorded executable, if the record exists and still points at a file
    pub fn recorded_executable(&self) -> Option<PathBuf> {
        let record = self.load_record()?;
        if record.executable_path.exists() {
            Some(record.executable_path)
        } else {
            self.ctx.logger.debug(&format!(
                "recorded {} path {} no longer exists",
                self.dependency.display_name(),
                record.executable_path.display()
            ));
            None
        }
    }

    /// Persist the install record
    pub fn save_record(&self, record: &InstallRecord) -> Result<(), DepsCheckerError> {
        record.save(&self.record_path()).map_err(|e| {
            DepsCheckerError::download_or_install_failure(self.dependency, e.to_string())
        })
    }

    /// Fresh, uniquely named directory for a new install
    pub fn staging(&self) -> Result<TempDir, DepsCheckerError> {
        atomic::staging_dir(&self.bin_dir, &format!("{}-", self.tool)).map_err(|e| {
            DepsCheckerError::download_or_install_failure(
                self.dependency,
                format!("cannot create install directory in {}: {}", self.bin_dir.display(), e),
            )
        })
    }

    /// Make a validated install current
    ///
    /// `executable` must live inside `staging`. The staging directory is kept,
    /// the record is switched to it, and only then is the directory of the
    /// previously recorded install removed.
    pub fn commit(
        &self,
        staging: TempDir,
        executable: &Path,
        version: Option<String>,
    ) -> Result<PathBuf, DepsCheckerError> {
        let previous = self
            .load_record()
            .and_then(|record| self.owned_install_dir(&record.executable_path));

        let install_dir = staging.keep();
        let mut record = InstallRecord::new(executable);
        record.version = version;
        if let Err(e) = self.save_record(&record) {
            let _ = fs::remove_dir_all(&install_dir);
            return Err(e);
        }

        if let Some(previous) = previous.filter(|dir| *dir != install_dir) {
            if let Err(e) = fs::remove_dir_all(&previous) {
                self.ctx.logger.debug(&format!(
                    "cannot remove previous install {}: {}",
                    previous.display(),
                    e
                ));
            }
        }
        Ok(executable.to_path_buf())
    }

    /// The install directory under `bin/` this installer created for `path`
    ///
    /// `None` for anything outside `bin/` (a recorded system install) or
    /// belonging to another tool.
    fn owned_install_dir(&self, path: &Path) -> Option<PathBuf> {
        let relative = path.strip_prefix(&self.bin_dir).ok()?;
        let first = relative.components().next()?.as_os_str();
        let name = first.to_string_lossy();
        let owned = name == self.tool.as_str()
            || name
                .strip_prefix(self.tool.as_str())
                .is_some_and(|rest| rest.starts_with('-'));
        owned.then(|| self.bin_dir.join(first))
    }

    /// Run an install step with the install timeout
    ///
    /// A spawn failure, a timeout and a non-zero exit all become
    /// `DownloadOrInstallFailure`.
    pub async fn run_install(&self, spec: CommandSpec) -> Result<CommandOutput, DepsCheckerError> {
        let spec = spec.timeout(self.ctx.config.install_timeout);
        self.ctx.logger.debug(&format!("running {}", spec.display()));

        let output = self.ctx.runner.run(&spec).await.map_err(|e| {
            DepsCheckerError::download_or_install_failure(self.dependency, e.to_string())
        })?;

        if !output.success() {
            let code = output
                .exit_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            return Err(DepsCheckerError::download_or_install_failure(
                self.dependency,
                format!("'{}' exited with {}: {}", spec.program, code, output.combined()),
            ));
        }
        Ok(output)
    }

    /// Run a version probe with the probe timeout, `None` unless it succeeds
    pub async fn probe(&self, spec: CommandSpec) -> Option<CommandOutput> {
        let spec = spec.timeout(self.ctx.config.probe_timeout);
        match self.ctx.runner.run(&spec).await {
            Ok(output) if output.success() => Some(output),
            Ok(output) => {
                self.ctx.logger.debug(&format!(
                    "'{}' exited with {:?}: {}",
                    spec.display(),
                    output.exit_code,
                    output.combined()
                ));
                None
            }
            Err(e) => {
                self.ctx.logger.debug(&e.to_string());
                None
            }
        }
    }

    fn base_properties(&self) -> Properties {
        let os = self.ctx.platform.os().to_string();
        properties([("dependency", self.dependency.id()), ("os", os.as_str())])
    }

    /// Announce the start of an install
    pub fn started(&self) {
        self.ctx.logger.info(&format!(
            "Installing {} into {}...",
            self.dependency.display_name(),
            self.bin_dir.display()
        ));
        self.ctx.telemetry.send_event(
            &DepsCheckerEvent::InstallStart.scoped(self.dependency.id()),
            &self.base_properties(),
        );
    }

    /// Announce a successful install
    pub fn completed(&self, version: Option<&str>) {
        self.ctx.logger.info(&format!(
            "Successfully installed {}{}",
            self.dependency.display_name(),
            version.map(|v| format!(" {}", v)).unwrap_or_default()
        ));
        let mut props = self.base_properties();
        if let Some(v) = version {
            props.insert("version".to_string(), v.to_string());
        }
        self.ctx.telemetry.send_event(
            &DepsCheckerEvent::InstallCompleted.scoped(self.dependency.id()),
            &props,
        );
    }

    /// Report a failed install through logger and telemetry, returning the error
    pub fn failed(&self, error: DepsCheckerError) -> DepsCheckerError {
        self.ctx.logger.error(&format!(
            "{} (see {})",
            error,
            error.help_link()
        ));
        self.ctx.telemetry.send_error_event(
            &DepsCheckerEvent::InstallError.scoped(self.dependency.id()),
            &error,
            &self.base_properties(),
        );
        error
    }

    /// Announce that a portable fallback replaces the native install
    pub fn fallback_selected(&self, command: &str) {
        self.ctx.logger.warning(&format!(
            "{} cannot be installed on {}, using '{}' instead",
            self.dependency.display_name(),
            self.ctx.platform.os(),
            command
        ));
        let mut props = self.base_properties();
        props.insert("command".to_string(), command.to_string());
        self.ctx.telemetry.send_event(
            &DepsCheckerEvent::FallbackSelected.scoped(self.dependency.id()),
            &props,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::platform::OsFamily;
    use std::fs;

    fn installer(h: &Harness) -> PrivateInstaller {
        PrivateInstaller::new(DependencyType::Ngrok, "ngrok", h.ctx.clone())
    }

    #[test]
    fn test_paths() {
        let h = harness(FakePlatform::new(OsFamily::MacOs), FakeRunner::new());
        let installer = installer(&h);
        assert_eq!(installer.bin_dir(), h.root.path().join("bin"));
        assert_eq!(installer.record_path(), h.root.path().join("ngrok.json"));
    }

    #[test]
    fn test_corrupted_record_is_absent_and_logged() {
        let h = harness(FakePlatform::new(OsFamily::MacOs), FakeRunner::new());
        let installer = installer(&h);
        fs::write(installer.record_path(), "garbage").unwrap();

        assert!(installer.load_record().is_none());
        let lines = h.logger.lines.lock().unwrap();
        assert!(lines
            .iter()
            .any(|l| l.starts_with("warning:") && l.contains("corrupted")));
    }

    #[test]
    fn test_record_pointing_to_missing_path() {
        let h = harness(FakePlatform::new(OsFamily::MacOs), FakeRunner::new());
        let installer = installer(&h);
        installer
            .save_record(&InstallRecord::new(h.root.path().join("gone")))
            .unwrap();

        assert!(installer.load_record().is_some());
        assert!(installer.recorded_executable().is_none());
    }

    /// Stage an install holding `ngrok` with `body` and commit it
    fn install(installer: &PrivateInstaller, body: &str) -> PathBuf {
        let staging = installer.staging().unwrap();
        let exe = staging.path().join("ngrok");
        fs::write(&exe, body).unwrap();
        installer.commit(staging, &exe, Some(body.to_string())).unwrap()
    }

    #[test]
    fn test_commit_records_install() {
        let h = harness(FakePlatform::new(OsFamily::MacOs), FakeRunner::new());
        let installer = installer(&h);

        let exe = install(&installer, "2.3.40");
        assert!(exe.starts_with(h.root.path().join("bin")));
        let dir_name = exe.parent().unwrap().file_name().unwrap().to_string_lossy().into_owned();
        assert!(dir_name.starts_with("ngrok-"));

        let record = installer.load_record().unwrap();
        assert_eq!(record.executable_path, exe);
        assert_eq!(record.version.as_deref(), Some("2.3.40"));
        assert_eq!(installer.recorded_executable(), Some(exe));
    }

    #[test]
    fn test_previous_install_survives_until_record_switches() {
        let h = harness(FakePlatform::new(OsFamily::MacOs), FakeRunner::new());
        let installer = installer(&h);
        let old = install(&installer, "2.3.40");

        // a second install in progress is invisible to readers of the record
        let staging = installer.staging().unwrap();
        let new = staging.path().join("ngrok");
        fs::write(&new, "3.1.0").unwrap();
        assert!(old.exists());
        assert_eq!(installer.recorded_executable(), Some(old.clone()));

        let committed = installer.commit(staging, &new, None).unwrap();
        assert_eq!(committed, new);
        assert_eq!(installer.recorded_executable(), Some(new.clone()));
        assert!(!old.parent().unwrap().exists());
        assert_eq!(fs::read_dir(installer.bin_dir()).unwrap().count(), 1);
    }

    #[test]
    fn test_abandoned_install_leaves_previous_one() {
        let h = harness(FakePlatform::new(OsFamily::MacOs), FakeRunner::new());
        let installer = installer(&h);
        let old = install(&installer, "2.3.40");

        let staging = installer.staging().unwrap();
        fs::write(staging.path().join("ngrok"), "broken").unwrap();
        drop(staging);

        assert_eq!(installer.recorded_executable(), Some(old));
        assert_eq!(fs::read_dir(installer.bin_dir()).unwrap().count(), 1);
    }

    #[test]
    fn test_commit_keeps_recorded_system_install() {
        let h = harness(FakePlatform::new(OsFamily::MacOs), FakeRunner::new());
        let installer = installer(&h);
        let system = h.root.path().join("usr").join("ngrok");
        fs::create_dir_all(system.parent().unwrap()).unwrap();
        fs::write(&system, "").unwrap();
        installer.save_record(&InstallRecord::new(&system)).unwrap();

        install(&installer, "3.1.0");
        assert!(system.exists());
    }

    #[tokio::test]
    async fn test_run_install_non_zero_exit() {
        let runner = FakeRunner::new().on(|_| Some(CommandOutput::new(1, "", "EACCES")));
        let h = harness(FakePlatform::new(OsFamily::MacOs), runner);

        let err = installer(&h)
            .run_install(CommandSpec::new("npm").arg("install"))
            .await
            .unwrap_err();
        assert_eq!(err.name(), "DownloadOrInstallFailure");
        assert!(err.to_string().contains("EACCES"));
    }

    #[tokio::test]
    async fn test_run_install_uses_install_timeout() {
        let runner = FakeRunner::new().on(|_| Some(CommandOutput::new(0, "", "")));
        let h = harness(FakePlatform::new(OsFamily::MacOs), runner);

        installer(&h)
            .run_install(CommandSpec::new("npm"))
            .await
            .unwrap();
        assert_eq!(h.runner.calls()[0].timeout, h.ctx.config.install_timeout);
    }

    #[tokio::test]
    async fn test_failed_version_check_is_none() {
        let runner = FakeRunner::new().on(|_| Some(CommandOutput::new(127, "", "")));
        let h = harness(FakePlatform::new(OsFamily::MacOs), runner);
        assert!(installer(&h).probe(CommandSpec::new("ngrok")).await.is_none());
    }

    #[test]
    fn test_failed_reports_to_telemetry() {
        let h = harness(FakePlatform::new(OsFamily::MacOs), FakeRunner::new());
        let err = installer(&h).failed(DepsCheckerError::download_or_install_failure(
            DependencyType::Ngrok,
            "boom",
        ));

        assert_eq!(err.name(), "DownloadOrInstallFailure");
        let errors = h.telemetry.errors.lock().unwrap();
        assert_eq!(
            errors[0],
            (
                "ngrok-install-error".to_string(),
                "DownloadOrInstallFailure".to_string()
            )
        );
    }
}
