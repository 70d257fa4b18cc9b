//! Options accepted by the dependency manager

/// Default telemetry source label
pub const DEFAULT_SOURCE: &str = "cli";

/// Options for a single `ensure_dependencies` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepsOptions {
    /// Stop after the first failed dependency and return the partial result
    pub fast_fail: bool,
    /// Label of the caller, attached to telemetry events
    pub source: String,
}

impl Default for DepsOptions {
    fn default() -> Self {
        Self {
            fast_fail: false,
            source: DEFAULT_SOURCE.to_string(),
        }
    }
}

impl DepsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set fast-fail mode
    pub fn with_fast_fail(mut self, fast_fail: bool) -> Self {
        self.fast_fail = fast_fail;
        self
    }

    /// Set the telemetry source label
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}
