//! Tracing subscriber setup for the CLI
//!
//! Uses the same [`Verbosity`] as the report, so `--quiet` lowers the log
//! level and the report detail together.

use crate::output::Verbosity;
use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when RUST_LOG is not set
fn default_filter(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Quiet => "depcheck=warn",
        Verbosity::Normal => "depcheck=info",
        Verbosity::Verbose => "depcheck=debug",
    }
}

/// Initialize logging for the depcheck CLI
///
/// Logs go to stderr so that stdout only carries the report. The level can be
/// controlled via the RUST_LOG environment variable:
/// - RUST_LOG=depcheck=debug depcheck dotnet  (every probe and install step)
/// - RUST_LOG=depcheck::telemetry=debug depcheck  (telemetry events only)
pub fn init(verbosity: Verbosity) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbosity == Verbosity::Verbose)
                .without_time()
                .compact(),
        )
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    Ok(())
}
