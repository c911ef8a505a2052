//! Resolved runtime settings
//!
//! Built once at startup from the config file and CLI flags, then passed
//! explicitly to every component.

use super::schema::{CommandsConfig, Config};
use crate::error::{RelayError, RelayResult};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Default home directory name under the user's home
const DEFAULT_HOME_DIR: &str = ".relay-cli";

/// Managed installs live under `{home}/dependencies`
const DEPENDENCIES_DIR: &str = "dependencies";

/// Cache entries live under `{home}/dependencies/node_modules`
const STORE_DIR: &str = "node_modules";

/// Values supplied on the command line (or their env fallbacks)
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    /// Local package directory; bypasses the managed cache
    pub target_path: Option<PathBuf>,
    /// relay home directory
    pub home: Option<PathBuf>,
}

/// Effective settings for one relay invocation
#[derive(Debug, Clone)]
pub struct Settings {
    /// relay home directory
    pub home: PathBuf,
    /// Local override path, if configured
    pub target_path: Option<PathBuf>,
    /// Registry base URL
    pub registry_url: String,
    /// Command name to package name
    pub commands: CommandsConfig,
    /// Loader program overrides
    pub loaders: BTreeMap<String, String>,
}

impl Settings {
    /// Merge config and overrides. CLI values win over the config file.
    pub fn resolve(config: &Config, overrides: SettingsOverrides) -> RelayResult<Self> {
        let home = match overrides.home.or_else(|| config.paths.home.clone()) {
            Some(home) => home,
            None => dirs::home_dir()
                .ok_or(RelayError::HomeNotFound)?
                .join(DEFAULT_HOME_DIR),
        };

        Ok(Self {
            home,
            target_path: overrides.target_path,
            registry_url: config.registry.url.clone(),
            commands: config.commands.clone(),
            loaders: config.loaders.clone(),
        })
    }

    /// Root of managed installs
    pub fn dependencies_dir(&self) -> PathBuf {
        self.home.join(DEPENDENCIES_DIR)
    }

    /// Directory holding version-keyed cache entries
    pub fn store_dir(&self) -> PathBuf {
        self.dependencies_dir().join(STORE_DIR)
    }
}
