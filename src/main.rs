//! depcheck - developer toolchain checker CLI tool
//!
//! Resolves the requested toolchains (installing them privately under the
//! user's home when needed) and reports their status.

use anyhow::Context;
use clap::Parser;
use depcheck::checker::CheckerContext;
use depcheck::cli::CliArgs;
use depcheck::config::DepsConfig;
use depcheck::domain::{DependencyError, DependencyType, DepsOptions};
use depcheck::extensions::install_backend_extension;
use depcheck::logging;
use depcheck::manager::DepsManager;
use depcheck::output::{create_formatter, ExtensionReport, OutputConfig, Report, Verbosity};
use depcheck::platform::{Platform, SystemPlatform};
use depcheck::progress;
use depcheck::telemetry::{TracingLogger, TracingTelemetry};
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    if args.list {
        print_dependency_list();
        return ExitCode::SUCCESS;
    }

    if let Err(e) = logging::init(Verbosity::from_flags(args.verbose, args.quiet)) {
        eprintln!("Warning: {:#}", e);
    }

    // Run the main logic and handle errors
    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_dependency_list() {
    for dependency in DependencyType::all() {
        println!("{:<16} {}", dependency.id(), dependency.display_name());
    }
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let config = DepsConfig::from_env(SystemPlatform::new().home_dir().as_deref())?;
    tracing::debug!(install_root = %config.install_root.display(), "configuration loaded");

    let ctx = CheckerContext::system(
        Arc::new(TracingLogger),
        Arc::new(TracingTelemetry),
        config,
    )
    .context("Failed to create the downloader")?;
    let manager = DepsManager::new(ctx.clone()).with_progress(args.show_progress());

    let requested = args.requested();
    let statuses = if args.check_only {
        manager.check_dependencies(&requested).await
    } else {
        let options = DepsOptions::new()
            .with_fast_fail(args.fast_fail)
            .with_source(args.source.clone());
        manager.ensure_dependencies(&requested, &options).await
    };
    let mut report = Report::new(statuses, args.check_only);

    if let Some(ref backend_root) = args.backend_extensions {
        let dotnet = report
            .statuses
            .iter()
            .find(|s| s.name == DependencyType::Dotnet && !s.is_failure())
            .map(|s| s.command.clone());

        // without a usable .NET SDK the failure is already reported on the dotnet status
        if let (Some(dotnet), false) = (dotnet, args.check_only) {
            let spinner = progress::spinner(args.show_progress(), "Installing backend extensions...");
            let result = install_backend_extension(&ctx, backend_root, &dotnet).await;
            if let Some(spinner) = spinner {
                spinner.finish_and_clear();
            }

            report = report.with_extensions(match result {
                Ok(built) => ExtensionReport {
                    backend_root: backend_root.clone(),
                    built,
                    error: None,
                },
                Err(e) => ExtensionReport {
                    backend_root: backend_root.clone(),
                    built: false,
                    error: Some(DependencyError::from(&e)),
                },
            });
        }
    }

    let formatter = create_formatter(OutputConfig::from_cli(args.json, args.verbose, args.quiet));
    let mut stdout = io::stdout().lock();
    formatter.format(&report, &mut stdout)?;
    stdout.flush()?;

    if report.has_failures() {
        // Partial success - some dependencies are not usable
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
