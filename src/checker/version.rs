//! Version extraction and supported-range matching
//!
//! Tool output is loose (`v16.3.0`, `3.1.426 [/usr/share/dotnet/sdk]`,
//! `Bicep CLI version 0.4.1008 (223b8d227a)`), so versions are pulled out with
//! a regex and padded to a full semver before matching.

use regex::Regex;
use semver::{Version, VersionReq};
use std::sync::LazyLock;

// major.minor with optional patch, anywhere in the text
static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?").unwrap());

/// Extract the first version number found in `text`
pub fn extract_version(text: &str) -> Option<Version> {
    let caps = VERSION_RE.captures(text)?;
    let major = caps.get(1)?.as_str().parse().ok()?;
    let minor = caps.get(2)?.as_str().parse().ok()?;
    let patch = caps
        .get(3)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0);
    Some(Version::new(major, minor, patch))
}

/// Extract every version found at the start of a line (e.g. `dotnet --list-sdks`)
pub fn extract_line_versions(text: &str) -> Vec<Version> {
    text.lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.starts_with(|c: char| c.is_ascii_digit()) {
                extract_version(line)
            } else {
                None
            }
        })
        .collect()
}

/// A set of supported version ranges with their display labels
#[derive(Debug, Clone)]
pub struct SupportedVersions {
    ranges: Vec<(String, VersionReq)>,
}

impl SupportedVersions {
    /// Build from `(label, requirement)` pairs
    ///
    /// Requirements are compile-time constants, so a malformed one is a bug.
    pub fn new(ranges: &[(&str, &str)]) -> Self {
        let ranges = ranges
            .iter()
            .map(|(label, req)| {
                let req = VersionReq::parse(req)
                    .unwrap_or_else(|e| panic!("invalid version requirement '{}': {}", req, e));
                (label.to_string(), req)
            })
            .collect();
        Self { ranges }
    }

    /// Returns true if `version` falls into any supported range
    pub fn matches(&self, version: &Version) -> bool {
        self.ranges.iter().any(|(_, req)| req.matches(version))
    }

    /// Display labels, in declaration order
    pub fn labels(&self) -> Vec<String> {
        self.ranges.iter().map(|(label, _)| label.clone()).collect()
    }
}
