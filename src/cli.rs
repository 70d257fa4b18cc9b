//! CLI argument parsing module for depcheck

use crate::domain::{DependencyType, DEFAULT_SOURCE};
use clap::Parser;
use std::path::PathBuf;

/// Developer toolchain checker and installer
#[derive(Parser, Debug, Clone)]
#[command(
    name = "depcheck",
    version,
    about = "Detect, validate and privately install developer toolchains"
)]
pub struct CliArgs {
    /// Dependencies to resolve (default: all)
    #[arg(value_enum)]
    pub deps: Vec<DependencyType>,

    /// Stop at the first dependency that cannot be resolved
    #[arg(long)]
    pub fast_fail: bool,

    /// Only report what is installed, never install anything
    #[arg(long)]
    pub check_only: bool,

    /// Build the binding extensions of the backend project in DIR afterwards
    #[arg(long, value_name = "DIR")]
    pub backend_extensions: Option<PathBuf>,

    /// Telemetry source label of the caller
    #[arg(long, default_value = DEFAULT_SOURCE)]
    pub source: String,

    /// List the known dependencies and exit
    #[arg(long)]
    pub list: bool,

    // Output options
    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long)]
    pub quiet: bool,
}

impl CliArgs {
    /// Dependencies to resolve; every known dependency when none is given
    pub fn requested(&self) -> Vec<DependencyType> {
        let mut deps = self.deps.clone();
        if deps.is_empty() {
            deps.extend_from_slice(DependencyType::all());
        }
        // extensions are built with the resolved .NET SDK
        if self.backend_extensions.is_some() && !deps.contains(&DependencyType::Dotnet) {
            deps.push(DependencyType::Dotnet);
        }
        deps
    }

    /// Whether to draw progress bars
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.json
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_default_args() {
        let args = CliArgs::parse_from(["depcheck"]);
        assert!(args.deps.is_empty());
        assert!(!args.fast_fail);
        assert!(!args.check_only);
        assert!(args.backend_extensions.is_none());
        assert_eq!(args.source, "cli");
        assert!(!args.list);
        assert!(!args.json);
        assert!(!args.verbose);
        assert!(!args.quiet);
    }

    #[test]
    fn test_positional_deps() {
        let args = CliArgs::parse_from(["depcheck", "dotnet", "azure-node", "func-core-tools"]);
        assert_eq!(
            args.deps,
            vec![
                DependencyType::Dotnet,
                DependencyType::AzureNode,
                DependencyType::FuncCoreTools
            ]
        );
    }

    #[test]
    fn test_invalid_dep() {
        assert!(CliArgs::try_parse_from(["depcheck", "python"]).is_err());
    }

    #[test]
    fn test_requested_defaults_to_all() {
        let args = CliArgs::parse_from(["depcheck"]);
        assert_eq!(args.requested(), DependencyType::all());
    }

    #[test]
    fn test_requested_keeps_explicit_list() {
        let args = CliArgs::parse_from(["depcheck", "ngrok", "ngrok"]);
        assert_eq!(args.requested(), vec![DependencyType::Ngrok, DependencyType::Ngrok]);
    }

    #[test]
    fn test_backend_extensions_adds_dotnet() {
        let args = CliArgs::parse_from(["depcheck", "azure-node", "--backend-extensions", "api"]);
        assert_eq!(args.backend_extensions, Some(PathBuf::from("api")));
        assert_eq!(
            args.requested(),
            vec![DependencyType::AzureNode, DependencyType::Dotnet]
        );
    }

    #[test]
    fn test_quiet_flags() {
        let args = CliArgs::parse_from(["depcheck", "-q"]);
        assert!(args.quiet);
        assert!(!args.show_progress());

        let args = CliArgs::parse_from(["depcheck", "--quiet"]);
        assert!(args.quiet);
    }

    #[test]
    fn test_json_disables_progress() {
        let args = CliArgs::parse_from(["depcheck", "--json"]);
        assert!(args.json);
        assert!(!args.show_progress());
    }

    #[test]
    fn test_combined_flags() {
        let args = CliArgs::parse_from([
            "depcheck",
            "bicep",
            "--fast-fail",
            "--check-only",
            "--source",
            "vsc",
            "--verbose",
        ]);
        assert_eq!(args.deps, vec![DependencyType::Bicep]);
        assert!(args.fast_fail);
        assert!(args.check_only);
        assert_eq!(args.source, "vsc");
        assert!(args.verbose);
        assert!(args.show_progress());
    }
}
