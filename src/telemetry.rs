//! Logger and telemetry sinks consumed by checkers and the manager
//!
//! The concrete sinks (editor output channel, telemetry reporter) live outside
//! this crate; the defaults here forward everything to `tracing`.

use crate::error::DepsCheckerError;
use std::collections::BTreeMap;
use std::fmt;

/// Properties attached to a telemetry event
pub type Properties = BTreeMap<String, String>;

/// Leveled logger used to narrate checks and installs to the user
pub trait DepsLogger: Send + Sync {
    fn info(&self, message: &str);
    fn debug(&self, message: &str);
    fn warning(&self, message: &str);
    fn error(&self, message: &str);
}

/// Telemetry sink
pub trait DepsTelemetry: Send + Sync {
    /// Record a named event
    fn send_event(&self, event: &str, properties: &Properties);

    /// Record a named failure event
    fn send_error_event(&self, event: &str, error: &DepsCheckerError, properties: &Properties);
}

/// Event names emitted by the checker subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepsCheckerEvent {
    /// A private install started
    InstallStart,
    /// A private install finished successfully
    InstallCompleted,
    /// A private install failed
    InstallError,
    /// A portable fallback was selected instead of a native install
    FallbackSelected,
    /// One dependency was resolved by the manager
    DependencyResolved,
    /// One `ensure_dependencies` call finished
    EnsureDependencies,
}

impl DepsCheckerEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            DepsCheckerEvent::InstallStart => "install-start",
            DepsCheckerEvent::InstallCompleted => "install-completed",
            DepsCheckerEvent::InstallError => "install-error",
            DepsCheckerEvent::FallbackSelected => "fallback-selected",
            DepsCheckerEvent::DependencyResolved => "dependency-resolved",
            DepsCheckerEvent::EnsureDependencies => "ensure-dependencies",
        }
    }

    /// Event name scoped to a dependency, e.g. `dotnet-install-start`
    pub fn scoped(&self, scope: &str) -> String {
        format!("{}-{}", scope, self.as_str())
    }
}

impl fmt::Display for DepsCheckerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Logger that writes through `tracing`
#[derive(Debug, Default, Clone)]
pub struct TracingLogger;

impl DepsLogger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!(target: "depcheck::deps", "{}", message);
    }

    fn debug(&self, message: &str) {
        tracing::debug!(target: "depcheck::deps", "{}", message);
    }

    fn warning(&self, message: &str) {
        tracing::warn!(target: "depcheck::deps", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "depcheck::deps", "{}", message);
    }
}

/// Telemetry sink that records events as `tracing` debug events
#[derive(Debug, Default, Clone)]
pub struct TracingTelemetry;

impl DepsTelemetry for TracingTelemetry {
    fn send_event(&self, event: &str, properties: &Properties) {
        tracing::debug!(target: "depcheck::telemetry", event_name = event, ?properties, "telemetry event");
    }

    fn send_error_event(&self, event: &str, error: &DepsCheckerError, properties: &Properties) {
        tracing::debug!(
            target: "depcheck::telemetry",
            event_name = event,
            error_name = error.name(),
            error_message = %error,
            ?properties,
            "telemetry error event"
        );
    }
}

/// Build a property map from key/value pairs
pub fn properties<I, K, V>(pairs: I) -> Properties
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
