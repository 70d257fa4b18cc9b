//! Output formatting for dependency reports
//!
//! This module provides:
//! - Text output for human-readable display
//! - JSON output for machine processing

mod json;
mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;

use crate::domain::{DependencyError, DependencyStatus};
use std::io::Write;
use std::path::PathBuf;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for machine processing
    Json,
}

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Only failures
    Quiet,
    /// Normal output
    #[default]
    Normal,
    /// Commands and install details as well
    Verbose,
}

impl Verbosity {
    /// `--quiet` wins over `--verbose` for both the report and the log level
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }
}

/// Configuration for output formatting
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Output format (text, json)
    pub format: OutputFormat,
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Whether to use colors (when supported)
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            verbosity: Verbosity::default(),
            color: true,
        }
    }
}

impl OutputConfig {
    /// Create configuration from CLI arguments
    pub fn from_cli(json: bool, verbose: bool, quiet: bool) -> Self {
        let format = if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        };

        Self {
            format,
            verbosity: Verbosity::from_flags(verbose, quiet),
            color: true,
        }
    }
}

/// Outcome of building the backend binding extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionReport {
    /// Backend project directory
    pub backend_root: PathBuf,
    /// Whether a build ran (false when there was nothing to build)
    pub built: bool,
    /// Present when the build failed
    pub error: Option<DependencyError>,
}

/// Everything a single run produced
#[derive(Debug, Clone, Default)]
pub struct Report {
    /// One status per resolved dependency, in resolution order
    pub statuses: Vec<DependencyStatus>,
    /// Whether the run only probed without installing
    pub check_only: bool,
    /// Backend extension build, when requested
    pub extensions: Option<ExtensionReport>,
}

impl Report {
    pub fn new(statuses: Vec<DependencyStatus>, check_only: bool) -> Self {
        Self {
            statuses,
            check_only,
            extensions: None,
        }
    }

    pub fn with_extensions(mut self, extensions: ExtensionReport) -> Self {
        self.extensions = Some(extensions);
        self
    }

    /// Number of dependencies that are usable
    pub fn installed_count(&self) -> usize {
        self.statuses.iter().filter(|s| !s.is_failure()).count()
    }

    /// Whether anything failed or is missing
    pub fn has_failures(&self) -> bool {
        self.statuses.iter().any(DependencyStatus::is_failure)
            || self
                .extensions
                .as_ref()
                .is_some_and(|e| e.error.is_some())
    }
}

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format and write the whole report
    fn format(&self, report: &Report, writer: &mut dyn Write) -> std::io::Result<()>;

    /// Format and write a single dependency status
    fn format_status(
        &self,
        status: &DependencyStatus,
        check_only: bool,
        writer: &mut dyn Write,
    ) -> std::io::Result<()>;
}

/// Create an output formatter based on configuration
pub fn create_formatter(config: OutputConfig) -> Box<dyn OutputFormatter> {
    match config.format {
        OutputFormat::Text => Box::new(TextFormatter::with_color(config.verbosity, config.color)),
        OutputFormat::Json => Box::new(JsonFormatter::new(config.verbosity)),
    }
}
