//! Text output formatter for human-readable display
//!
//! This module provides:
//! - One line per dependency with a colored status marker
//! - Error message and help link for failed dependencies
//! - Backend extension build result
//! - Summary line

use crate::domain::DependencyStatus;
use crate::output::{ExtensionReport, OutputFormatter, Report, Verbosity};
use colored::Colorize;
use std::io::Write;

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            color: true,
        }
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    fn marker(&self, ok: bool) -> String {
        match (ok, self.color) {
            (true, true) => "✓".green().to_string(),
            (false, true) => "✗".red().to_string(),
            (true, false) => "✓".to_string(),
            (false, false) => "✗".to_string(),
        }
    }

    fn dimmed(&self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    fn format_extensions(
        &self,
        extensions: &ExtensionReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let root = extensions.backend_root.display();
        match (&extensions.error, extensions.built) {
            (Some(error), _) => {
                writeln!(writer, "{} Backend extensions: {}", self.marker(false), error.message)?;
                writeln!(writer, "    {}", self.dimmed(&format!("see {}", error.help_link)))
            }
            (None, true) => writeln!(
                writer,
                "{} Backend extensions installed in {}",
                self.marker(true),
                root
            ),
            (None, false) => {
                if self.verbosity == Verbosity::Quiet {
                    return Ok(());
                }
                writeln!(
                    writer,
                    "  {}",
                    self.dimmed(&format!("No backend extensions to install in {}", root))
                )
            }
        }
    }

    fn format_summary(&self, report: &Report, writer: &mut dyn Write) -> std::io::Result<()> {
        let total = report.statuses.len();
        let ready = report.installed_count();
        let noun = if total == 1 { "dependency" } else { "dependencies" };
        let line = format!("{} of {} {} ready", ready, total, noun);

        if !self.color {
            return writeln!(writer, "{}", line);
        }
        if ready == total {
            writeln!(writer, "{}", line.green().bold())
        } else {
            writeln!(writer, "{}", line.yellow().bold())
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, report: &Report, writer: &mut dyn Write) -> std::io::Result<()> {
        if report.statuses.is_empty() && report.extensions.is_none() {
            if self.verbosity != Verbosity::Quiet {
                writeln!(writer, "No dependencies to check")?;
            }
            return Ok(());
        }

        for status in &report.statuses {
            self.format_status(status, report.check_only, writer)?;
        }
        if let Some(ref extensions) = report.extensions {
            self.format_extensions(extensions, writer)?;
        }

        if self.verbosity != Verbosity::Quiet && !report.statuses.is_empty() {
            writeln!(writer)?;
            self.format_summary(report, writer)?;
        }
        Ok(())
    }

    fn format_status(
        &self,
        status: &DependencyStatus,
        check_only: bool,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let ok = !status.is_failure();
        if ok && self.verbosity == Verbosity::Quiet {
            return Ok(());
        }

        let name = status.name.display_name();
        let name = if self.color {
            name.bold().to_string()
        } else {
            name.to_string()
        };
        let version = status
            .details
            .install_version
            .as_deref()
            .map(|v| format!(" {}", v))
            .unwrap_or_default();

        if ok {
            writeln!(writer, "{} {}{}", self.marker(true), name, version)?;
            if self.verbosity == Verbosity::Verbose {
                writeln!(writer, "    {}", self.dimmed(&format!("command: {}", status.command)))?;
            }
            return Ok(());
        }

        match status.error {
            Some(ref error) => {
                writeln!(writer, "{} {}: {}", self.marker(false), name, error.message)?;
                writeln!(writer, "    {}", self.dimmed(&format!("see {}", error.help_link)))?;
            }
            None => {
                let state = if check_only {
                    "not installed"
                } else {
                    "not resolved"
                };
                writeln!(writer, "{} {}: {}", self.marker(false), name, state)?;
                if self.verbosity == Verbosity::Verbose {
                    writeln!(
                        writer,
                        "    {}",
                        self.dimmed(&format!(
                            "supported versions: {}",
                            status.details.supported_versions.join(", ")
                        ))
                    )?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures::*;
    use std::path::PathBuf;

    fn render(formatter: &TextFormatter, report: &Report) -> String {
        let mut buf = Vec::new();
        formatter.format(report, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_success_and_failure_lines() {
        let formatter = TextFormatter::with_color(Verbosity::Normal, false);
        let output = render(
            &formatter,
            &Report::new(vec![node_ok(), dotnet_failed()], false),
        );

        assert!(output.contains("✓ Node.js v16.14.2"));
        assert!(output.contains("✗ .NET Core SDK: .NET Core SDK is not supported on Linux"));
        assert!(output.contains("see https://aka.ms/teamsfx-envchecker-help#how-to-install-net-core-sdk"));
        assert!(output.contains("1 of 2 dependencies ready"));
    }

    #[test]
    fn test_quiet_shows_only_failures() {
        let formatter = TextFormatter::with_color(Verbosity::Quiet, false);
        let output = render(
            &formatter,
            &Report::new(vec![node_ok(), dotnet_failed()], false),
        );

        assert!(!output.contains("Node.js"));
        assert!(output.contains(".NET Core SDK"));
        assert!(!output.contains("ready"));
    }

    #[test]
    fn test_verbose_shows_command() {
        let formatter = TextFormatter::with_color(Verbosity::Verbose, false);
        let output = render(&formatter, &Report::new(vec![node_ok()], false));
        assert!(output.contains("command: node"));
        assert!(output.contains("1 of 1 dependency ready"));
    }

    #[test]
    fn test_check_only_missing() {
        let mut status = node_ok();
        status.is_installed = false;
        let formatter = TextFormatter::with_color(Verbosity::Normal, false);
        let output = render(&formatter, &Report::new(vec![status], true));
        assert!(output.contains("✗ Node.js: not installed"));
    }

    #[test]
    fn test_empty_report() {
        let formatter = TextFormatter::new(Verbosity::Normal);
        assert_eq!(render(&formatter, &Report::default()), "No dependencies to check\n");
    }

    #[test]
    fn test_extensions_line() {
        let formatter = TextFormatter::with_color(Verbosity::Normal, false);
        let report = Report::new(vec![node_ok()], false).with_extensions(ExtensionReport {
            backend_root: PathBuf::from("api"),
            built: true,
            error: None,
        });
        assert!(render(&formatter, &report).contains("✓ Backend extensions installed in api"));
    }
}
