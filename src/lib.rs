//! depcheck - developer toolchain checker library
//!
//! This library detects, validates and privately installs the toolchains a
//! Teams app project needs on a developer machine:
//! - .NET SDK
//! - Azure Functions Core Tools
//! - Node.js (Azure and SPFx flavours)
//! - ngrok
//! - Bicep CLI

pub mod atomic;
pub mod checker;
pub mod cli;
pub mod config;
pub mod domain;
pub mod download;
pub mod error;
pub mod extensions;
pub mod logging;
pub mod manager;
pub mod output;
pub mod platform;
pub mod progress;
pub mod runner;
pub mod telemetry;
