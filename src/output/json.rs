//! JSON output formatter for machine processing
//!
//! This module provides:
//! - JSON serialization of dependency statuses (camelCase, as consumed by editors)
//! - Summary counts and the backend extension result

use crate::domain::{DependencyError, DependencyStatus};
use crate::output::{OutputFormatter, Report, Verbosity};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Verbosity level affects detail in output
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

/// JSON representation of the full report
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonOutput<'a> {
    /// Whether this run only probed
    check_only: bool,
    /// Summary statistics
    summary: JsonSummary,
    /// Per-dependency statuses
    dependencies: Vec<&'a DependencyStatus>,
    /// Backend extension build
    #[serde(skip_serializing_if = "Option::is_none")]
    backend_extensions: Option<JsonExtensions<'a>>,
}

/// JSON representation of summary statistics
#[derive(Serialize)]
struct JsonSummary {
    /// Number of statuses reported
    total: usize,
    /// Number of usable dependencies
    installed: usize,
    /// Number of failed or missing dependencies
    failed: usize,
}

/// JSON representation of the extension build
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonExtensions<'a> {
    path: String,
    built: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a DependencyError>,
}

impl JsonFormatter {
    fn to_json<'a>(&self, report: &'a Report) -> JsonOutput<'a> {
        let installed = report.installed_count();
        // quiet mode keeps only the entries a caller has to act on
        let dependencies = report
            .statuses
            .iter()
            .filter(|s| self.verbosity != Verbosity::Quiet || s.is_failure())
            .collect();

        JsonOutput {
            check_only: report.check_only,
            summary: JsonSummary {
                total: report.statuses.len(),
                installed,
                failed: report.statuses.len() - installed,
            },
            dependencies,
            backend_extensions: report.extensions.as_ref().map(|e| JsonExtensions {
                path: e.backend_root.display().to_string(),
                built: e.built,
                error: e.error.as_ref(),
            }),
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, report: &Report, writer: &mut dyn Write) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(&self.to_json(report))
            .map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)
    }

    fn format_status(
        &self,
        status: &DependencyStatus,
        _check_only: bool,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let json = serde_json::to_string(status).map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures::*;

    fn render(formatter: &JsonFormatter, report: &Report) -> serde_json::Value {
        let mut buf = Vec::new();
        formatter.format(report, &mut buf).unwrap();
        serde_json::from_slice(&buf).unwrap()
    }

    #[test]
    fn test_report_shape() {
        let formatter = JsonFormatter::new(Verbosity::Normal);
        let value = render(
            &formatter,
            &Report::new(vec![node_ok(), dotnet_failed()], false),
        );

        assert_eq!(value["checkOnly"], false);
        assert_eq!(value["summary"]["total"], 2);
        assert_eq!(value["summary"]["installed"], 1);
        assert_eq!(value["summary"]["failed"], 1);

        let deps = value["dependencies"].as_array().unwrap();
        assert_eq!(deps[0]["name"], "azure-node");
        assert_eq!(deps[0]["isInstalled"], true);
        assert_eq!(deps[0]["details"]["installVersion"], "v16.14.2");
        assert!(deps[0].get("error").is_none());

        assert_eq!(deps[1]["name"], "dotnet");
        assert_eq!(deps[1]["error"]["name"], "UnsupportedPlatform");
        assert_eq!(deps[1]["details"]["isLinuxSupported"], false);
        assert!(value.get("backendExtensions").is_none());
    }

    #[test]
    fn test_quiet_keeps_failures_only() {
        let formatter = JsonFormatter::new(Verbosity::Quiet);
        let value = render(
            &formatter,
            &Report::new(vec![node_ok(), dotnet_failed()], false),
        );
        let deps = value["dependencies"].as_array().unwrap();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0]["name"], "dotnet");
        assert_eq!(value["summary"]["total"], 2);
    }

    #[test]
    fn test_single_status_line() {
        let formatter = JsonFormatter::new(Verbosity::Normal);
        let mut buf = Vec::new();
        formatter.format_status(&node_ok(), false, &mut buf).unwrap();
        let output = String::from_utf8(buf).unwrap();
        assert_eq!(output.lines().count(), 1);
        assert!(output.contains("\"command\":\"node\""));
    }
}
