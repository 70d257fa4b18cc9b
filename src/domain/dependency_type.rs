//! Dependency type definitions for the supported developer toolchains

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Base help page for environment checker failures
pub const DEFAULT_HELP_LINK: &str = "https://aka.ms/teamsfx-envchecker-help";

/// External toolchains the checker knows how to detect and install
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyType {
    /// .NET SDK (Azure Functions binding extensions)
    Dotnet,
    /// Azure Functions Core Tools
    FuncCoreTools,
    /// Bicep CLI
    Bicep,
    /// Node.js for Azure hosted projects
    AzureNode,
    /// Node.js for SharePoint Framework projects
    SpfxNode,
    /// ngrok tunnel for local bot debugging
    Ngrok,
}

impl DependencyType {
    /// Returns the display name for this dependency
    pub fn display_name(&self) -> &'static str {
        match self {
            DependencyType::Dotnet => ".NET Core SDK",
            DependencyType::FuncCoreTools => "Azure Functions Core Tools",
            DependencyType::Bicep => "Bicep CLI",
            DependencyType::AzureNode => "Node.js",
            DependencyType::SpfxNode => "Node.js (SPFx)",
            DependencyType::Ngrok => "ngrok",
        }
    }

    /// Returns the stable identifier used in records, telemetry and the CLI
    pub fn id(&self) -> &'static str {
        match self {
            DependencyType::Dotnet => "dotnet",
            DependencyType::FuncCoreTools => "func-core-tools",
            DependencyType::Bicep => "bicep",
            DependencyType::AzureNode => "azure-node",
            DependencyType::SpfxNode => "spfx-node",
            DependencyType::Ngrok => "ngrok",
        }
    }

    /// Returns the help link for installation problems with this dependency
    pub fn help_link(&self) -> String {
        let anchor = match self {
            DependencyType::Dotnet => "how-to-install-net-core-sdk",
            DependencyType::FuncCoreTools => "how-to-install-azure-functions-core-tools",
            DependencyType::Bicep => "how-to-install-bicep-cli",
            DependencyType::AzureNode => "how-to-install-nodejs",
            DependencyType::SpfxNode => "how-to-install-nodejs-for-spfx",
            DependencyType::Ngrok => "how-to-install-ngrok",
        };
        format!("{}#{}", DEFAULT_HELP_LINK, anchor)
    }

    /// Returns all dependency types in resolution order
    pub fn all() -> &'static [DependencyType] {
        &[
            DependencyType::AzureNode,
            DependencyType::SpfxNode,
            DependencyType::Dotnet,
            DependencyType::FuncCoreTools,
            DependencyType::Ngrok,
            DependencyType::Bicep,
        ]
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
