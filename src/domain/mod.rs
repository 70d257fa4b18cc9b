//! Core domain models for depcheck
//!
//! This module contains the fundamental types used throughout the application:
//! - Dependency types for the supported toolchains
//! - Descriptive metadata reported by checkers
//! - Resolution status and structured errors
//! - Options for the dependency manager

mod dependency_type;
mod deps_info;
mod options;
mod status;

pub use dependency_type::{DependencyType, DEFAULT_HELP_LINK};
pub use deps_info::DepsInfo;
pub use options::{DepsOptions, DEFAULT_SOURCE};
pub use status::{DependencyError, DependencyStatus, StatusDetails};
