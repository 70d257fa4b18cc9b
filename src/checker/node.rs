//! Node.js checker (Azure and SPFx flavours)
//!
//! Node.js is never installed privately; the user is pointed at the help page
//! when it is missing or its version is outside the supported range.

use super::version::{extract_version, SupportedVersions};
use super::{CheckerContext, DepsChecker};
use crate::domain::{DependencyType, DepsInfo};
use crate::error::DepsCheckerError;
use crate::runner::CommandSpec;
use crate::telemetry::{properties, DepsCheckerEvent};
use async_trait::async_trait;
use semver::Version;

const NODE_COMMAND: &str = "node";

const AZURE_SUPPORTED: &[(&str, &str)] = &[("v14", "^14"), ("v16", "^16"), ("v18", "^18")];
const SPFX_SUPPORTED: &[(&str, &str)] = &[("v12", "^12"), ("v14", "^14"), ("v16", "^16")];

pub struct NodeChecker {
    dependency: DependencyType,
    supported: SupportedVersions,
    ctx: CheckerContext,
}

impl NodeChecker {
    /// Node.js for Azure hosted projects
    pub fn azure(ctx: CheckerContext) -> Self {
        Self {
            dependency: DependencyType::AzureNode,
            supported: SupportedVersions::new(AZURE_SUPPORTED),
            ctx,
        }
    }

    /// Node.js for SharePoint Framework projects
    pub fn spfx(ctx: CheckerContext) -> Self {
        Self {
            dependency: DependencyType::SpfxNode,
            supported: SupportedVersions::new(SPFX_SUPPORTED),
            ctx,
        }
    }

    async fn installed_version(&self) -> Option<Version> {
        self.ctx.platform.find_command(NODE_COMMAND)?;
        let spec = CommandSpec::new(NODE_COMMAND)
            .arg("--version")
            .timeout(self.ctx.config.probe_timeout);
        match self.ctx.runner.run(&spec).await {
            Ok(output) if output.success() => extract_version(&output.stdout),
            Ok(_) => None,
            Err(e) => {
                self.ctx.logger.debug(&e.to_string());
                None
            }
        }
    }

    fn report(&self, error: DepsCheckerError) -> DepsCheckerError {
        self.ctx.logger.error(&format!("{} (see {})", error, error.help_link()));
        self.ctx.telemetry.send_error_event(
            &DepsCheckerEvent::InstallError.scoped(self.dependency.id()),
            &error,
            &properties([("dependency", self.dependency.id())]),
        );
        error
    }
}

#[async_trait]
impl DepsChecker for NodeChecker {
    fn dependency_type(&self) -> DependencyType {
        self.dependency
    }

    async fn is_installed(&self) -> bool {
        self.installed_version()
            .await
            .is_some_and(|v| self.supported.matches(&v))
    }

    async fn command(&self) -> String {
        NODE_COMMAND.to_string()
    }

    async fn get_deps_info(&self) -> DepsInfo {
        let version = self.installed_version().await;
        DepsInfo::new(self.dependency.display_name(), true)
            .with_supported_versions(self.supported.labels())
            .with_install_version(version.map(|v| format!("v{}", v)))
    }

    async fn install(&self) -> Result<(), DepsCheckerError> {
        match self.installed_version().await {
            None => Err(self.report(DepsCheckerError::command_not_found(
                self.dependency,
                NODE_COMMAND,
            ))),
            Some(version) if !self.supported.matches(&version) => {
                Err(self.report(DepsCheckerError::version_too_old(
                    self.dependency,
                    format!("v{}", version),
                    self.supported.labels(),
                )))
            }
            Some(_) => Ok(()),
        }
    }
}
