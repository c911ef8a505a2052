//! Configuration schema for relay
//!
//! Configuration is stored at `~/.config/relay/config.toml`

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Default npm-compatible registry
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Package registry settings
    pub registry: RegistryConfig,

    /// Filesystem locations
    pub paths: PathsConfig,

    /// Command name to implementing package
    pub commands: CommandsConfig,

    /// Loader name to program override (e.g. node = "/opt/node/bin/node")
    pub loaders: BTreeMap<String, String>,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,

    /// Check the registry for a newer relay release on startup
    pub update_check: bool,

    /// Package name relay itself is published under
    pub self_package: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
            update_check: true,
            self_package: "relay-cli".to_string(),
        }
    }
}

/// Registry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Base URL; package documents live at `{url}/{name}`
    pub url: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REGISTRY.to_string(),
        }
    }
}

/// Filesystem locations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// relay home directory (defaults to `~/.relay-cli`)
    pub home: Option<PathBuf>,
}

/// Command table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandsConfig(pub BTreeMap<String, String>);

impl Default for CommandsConfig {
    fn default() -> Self {
        let mut table = BTreeMap::new();
        table.insert("init".to_string(), "@relay-cli/init".to_string());
        Self(table)
    }
}

impl CommandsConfig {
    /// Package implementing `command`, if any
    pub fn package_for(&self, command: &str) -> Option<&str> {
        self.0.get(command).map(String::as_str)
    }

    /// Names of all configured commands
    pub fn names(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }
}
