//! Dependency manager coordinating checkers for a set of dependency types
//!
//! This module provides:
//! - De-duplication and a fixed resolution order
//! - Sequential resolution with optional fast-fail
//! - Aggregation into `DependencyStatus` values
//! - Per-dependency and aggregate telemetry

use crate::checker::{create_checker, CheckerContext, DepsChecker};
use crate::domain::{DependencyStatus, DependencyType, DepsOptions};
use crate::progress::ResolveProgress;
use crate::telemetry::{properties, DepsCheckerEvent};
use std::sync::Arc;

/// Builds the checker for a dependency type
pub type CheckerFactory =
    Arc<dyn Fn(DependencyType, &CheckerContext) -> Box<dyn DepsChecker> + Send + Sync>;

/// Position of a dependency in the resolution order
fn order_index(dependency: DependencyType) -> usize {
    DependencyType::all()
        .iter()
        .position(|d| *d == dependency)
        .unwrap_or(usize::MAX)
}

/// Remove duplicates and sort into resolution order
pub fn resolution_order(dependencies: &[DependencyType]) -> Vec<DependencyType> {
    let mut ordered: Vec<DependencyType> = Vec::with_capacity(dependencies.len());
    for dependency in dependencies {
        if !ordered.contains(dependency) {
            ordered.push(*dependency);
        }
    }
    // stable, so anything outside the known order keeps its request order at the end
    ordered.sort_by_key(|d| order_index(*d));
    ordered
}

/// Manager for resolving dependencies
pub struct DepsManager {
    ctx: CheckerContext,
    factory: CheckerFactory,
    show_progress: bool,
}

impl DepsManager {
    /// Create a manager using the built-in checkers
    pub fn new(ctx: CheckerContext) -> Self {
        Self::with_factory(ctx, Arc::new(create_checker))
    }

    /// Create a manager with a custom checker factory (for testing)
    pub fn with_factory(ctx: CheckerContext, factory: CheckerFactory) -> Self {
        Self {
            ctx,
            factory,
            show_progress: false,
        }
    }

    /// Enable or disable the progress bar
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Make every requested dependency usable, installing where needed
    ///
    /// Returns one status per distinct dependency in resolution order, or a
    /// prefix ending at the first failure when `fast_fail` is set. An empty
    /// request has no side effects.
    pub async fn ensure_dependencies(
        &self,
        dependencies: &[DependencyType],
        options: &DepsOptions,
    ) -> Vec<DependencyStatus> {
        if dependencies.is_empty() {
            return Vec::new();
        }

        let ordered = resolution_order(dependencies);
        let mut progress = ResolveProgress::new(self.show_progress, ordered.len());

        let mut statuses = Vec::with_capacity(ordered.len());
        for dependency in &ordered {
            progress.begin(*dependency, "Resolving");
            let checker = (self.factory)(*dependency, &self.ctx);

            let outcome = checker.ensure().await;
            let status = DependencyStatus::new(
                *dependency,
                checker.command().await,
                checker.get_deps_info().await,
                outcome.as_ref().map(|_| ()),
            );
            self.send_resolved(&status, options);
            progress.finish(&status);

            let failed = status.is_failure();
            statuses.push(status);
            if failed && options.fast_fail {
                tracing::debug!(dependency = %dependency, "stopping after first failure");
                break;
            }
        }
        progress.done();

        let failures = statuses.iter().filter(|s| s.is_failure()).count();
        self.ctx.telemetry.send_event(
            DepsCheckerEvent::EnsureDependencies.as_str(),
            &properties([
                ("source", options.source.clone()),
                ("requested", ordered.len().to_string()),
                ("resolved", statuses.len().to_string()),
                ("failed", failures.to_string()),
                ("fastFail", options.fast_fail.to_string()),
            ]),
        );

        statuses
    }

    /// Report the current state of each dependency without installing anything
    pub async fn check_dependencies(&self, dependencies: &[DependencyType]) -> Vec<DependencyStatus> {
        let ordered = resolution_order(dependencies);
        let mut progress = ResolveProgress::new(self.show_progress, ordered.len());
        let mut statuses = Vec::with_capacity(ordered.len());
        for dependency in ordered {
            progress.begin(dependency, "Checking");
            let checker = (self.factory)(dependency, &self.ctx);
            let installed = checker.is_installed().await;
            let mut status = DependencyStatus::new(
                dependency,
                checker.command().await,
                checker.get_deps_info().await,
                Ok(()),
            );
            status.is_installed = installed;
            progress.finish(&status);
            statuses.push(status);
        }
        progress.done();
        statuses
    }

    fn send_resolved(&self, status: &DependencyStatus, options: &DepsOptions) {
        let mut props = properties([
            ("dependency", status.name.id().to_string()),
            ("installed", status.is_installed.to_string()),
            ("source", options.source.clone()),
        ]);
        if let Some(ref error) = status.error {
            props.insert("errorName".to_string(), error.name.clone());
        }
        self.ctx
            .telemetry
            .send_event(DepsCheckerEvent::DependencyResolved.as_str(), &props);
    }
}
