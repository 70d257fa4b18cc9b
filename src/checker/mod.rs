//! Dependency checkers
//!
//! One [`DepsChecker`] per [`DependencyType`]. Each checker probes for a usable
//! install (private record first, then the search path) and, when none is
//! found, runs its install policy. Shared install plumbing lives in
//! [`PrivateInstaller`].

mod bicep;
mod dotnet;
mod func_tool;
mod ngrok;
mod node;
mod private_install;
mod record;
pub mod version;

pub use bicep::BicepChecker;
pub use dotnet::DotnetChecker;
pub use func_tool::FuncToolChecker;
pub use ngrok::NgrokChecker;
pub use node::NodeChecker;
pub use private_install::PrivateInstaller;
pub use record::InstallRecord;

use crate::config::DepsConfig;
use crate::domain::{DependencyType, DepsInfo};
use crate::download::{Downloader, HttpDownloader};
use crate::error::{DepsCheckerError, DownloadError};
use crate::platform::{Platform, SystemPlatform};
use crate::runner::{CommandRunner, SystemRunner};
use crate::telemetry::{DepsLogger, DepsTelemetry};
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for detecting and installing one dependency
#[async_trait]
pub trait DepsChecker: Send + Sync {
    /// The dependency this checker handles
    fn dependency_type(&self) -> DependencyType;

    /// Whether a usable install exists; never mutates state
    async fn is_installed(&self) -> bool;

    /// Command used to invoke the dependency
    async fn command(&self) -> String;

    /// Descriptive metadata
    async fn get_deps_info(&self) -> DepsInfo;

    /// Run the install policy unconditionally
    async fn install(&self) -> Result<(), DepsCheckerError>;

    /// Make the dependency usable, installing it when needed
    async fn ensure(&self) -> Result<(), DepsCheckerError> {
        if self.is_installed().await {
            return Ok(());
        }
        self.install().await
    }

    /// Same as [`ensure`](Self::ensure), reporting only whether to continue
    async fn resolve(&self) -> bool {
        self.ensure().await.is_ok()
    }
}

/// Collaborators shared by every checker
#[derive(Clone)]
pub struct CheckerContext {
    pub platform: Arc<dyn Platform>,
    pub runner: Arc<dyn CommandRunner>,
    pub downloader: Arc<dyn Downloader>,
    pub logger: Arc<dyn DepsLogger>,
    pub telemetry: Arc<dyn DepsTelemetry>,
    pub config: Arc<DepsConfig>,
}

impl CheckerContext {
    pub fn new(
        platform: Arc<dyn Platform>,
        runner: Arc<dyn CommandRunner>,
        downloader: Arc<dyn Downloader>,
        logger: Arc<dyn DepsLogger>,
        telemetry: Arc<dyn DepsTelemetry>,
        config: DepsConfig,
    ) -> Self {
        Self {
            platform,
            runner,
            downloader,
            logger,
            telemetry,
            config: Arc::new(config),
        }
    }

    /// Context backed by the real machine: processes, search path and network
    pub fn system(
        logger: Arc<dyn DepsLogger>,
        telemetry: Arc<dyn DepsTelemetry>,
        config: DepsConfig,
    ) -> Result<Self, DownloadError> {
        Ok(Self::new(
            Arc::new(SystemPlatform::new()),
            Arc::new(SystemRunner::new()),
            Arc::new(HttpDownloader::new()?),
            logger,
            telemetry,
            config,
        ))
    }
}

/// Create the checker for a dependency type
pub fn create_checker(dependency: DependencyType, ctx: &CheckerContext) -> Box<dyn DepsChecker> {
    match dependency {
        DependencyType::AzureNode => Box::new(NodeChecker::azure(ctx.clone())),
        DependencyType::SpfxNode => Box::new(NodeChecker::spfx(ctx.clone())),
        DependencyType::Dotnet => Box::new(DotnetChecker::new(ctx.clone())),
        DependencyType::FuncCoreTools => Box::new(FuncToolChecker::new(ctx.clone())),
        DependencyType::Ngrok => Box::new(NgrokChecker::new(ctx.clone())),
        DependencyType::Bicep => Box::new(BicepChecker::new(ctx.clone())),
    }
}
