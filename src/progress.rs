//! Live progress on stderr while dependencies are resolved
//!
//! One bar for the whole run. Each finished dependency leaves a ✓/✗ line
//! with its duration above the bar, so long installs show what already
//! happened while the next one is running.

use crate::domain::{DependencyStatus, DependencyType};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

const TICK: Duration = Duration::from_millis(100);

/// Progress of one `ensure_dependencies` or `check_dependencies` run
pub struct ResolveProgress {
    bar: Option<ProgressBar>,
    color: bool,
    started: Option<Instant>,
}

impl ResolveProgress {
    /// Bar over `total` dependencies; draws nothing when disabled
    pub fn new(enabled: bool, total: usize) -> Self {
        let bar = enabled.then(|| {
            let bar = ProgressBar::new(total as u64);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.cyan} [{pos}/{len}] {msg}")
                    .expect("Invalid template"),
            );
            bar.enable_steady_tick(TICK);
            bar
        });
        Self {
            bar,
            color: colored::control::SHOULD_COLORIZE.should_colorize(),
            started: None,
        }
    }

    /// Hidden progress, for library callers and tests
    pub fn hidden() -> Self {
        Self::new(false, 0)
    }

    /// A dependency is about to be probed or installed
    pub fn begin(&mut self, dependency: DependencyType, action: &str) {
        self.started = Some(Instant::now());
        if let Some(ref bar) = self.bar {
            bar.set_message(format!("{} {}...", action, dependency.display_name()));
        }
    }

    /// Print the outcome of the dependency started with [`begin`](Self::begin)
    pub fn finish(&mut self, status: &DependencyStatus) {
        let elapsed = self
            .started
            .take()
            .map(|started| started.elapsed())
            .unwrap_or_default();
        if let Some(ref bar) = self.bar {
            bar.println(status_line(status, elapsed, self.color));
            bar.inc(1);
        }
    }

    /// Remove the bar, keeping the printed lines
    pub fn done(self) {
        if let Some(bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}

/// `✓ Node.js (0.4s)` or `✗ .NET Core SDK: DownloadOrInstallFailure (12.0s)`
pub fn status_line(status: &DependencyStatus, elapsed: Duration, color: bool) -> String {
    let name = status.name.display_name();
    let took = format!("({:.1}s)", elapsed.as_secs_f64());
    let (marker, detail) = match (status.is_failure(), &status.error) {
        (false, _) => ("✓", String::new()),
        (true, Some(error)) => ("✗", format!(": {}", error.name)),
        (true, None) => ("✗", ": not installed".to_string()),
    };

    if !color {
        return format!("{} {}{} {}", marker, name, detail, took);
    }
    let marker = if status.is_failure() {
        marker.red()
    } else {
        marker.green()
    };
    format!("{} {}{} {}", marker, name.bold(), detail, took.dimmed())
}

/// Spinner for a single step outside dependency resolution
pub fn spinner(enabled: bool, message: &str) -> Option<ProgressBar> {
    enabled.then(|| {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("Invalid template"),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(TICK);
        spinner
    })
}
