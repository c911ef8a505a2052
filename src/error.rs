//! Error types for relay
//!
//! All modules use `RelayResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for relay operations
pub type RelayResult<T> = Result<T, RelayError>;

/// All errors that can occur in relay
#[derive(Error, Debug)]
pub enum RelayError {
    // Registry errors
    #[error("Registry request failed for {package}: {reason}")]
    Registry { package: String, reason: String },

    #[error("No published versions found for {0}")]
    NoVersions(String),

    #[error("Version {version} of {package} is not published in the registry")]
    VersionNotFound { package: String, version: String },

    // Install errors
    #[error("Failed to install {package}@{version}: {reason}")]
    Install {
        package: String,
        version: String,
        reason: String,
    },

    #[error("Integrity check failed for {package}@{version}")]
    Integrity { package: String, version: String },

    #[error("Invalid package spec: {0}")]
    InvalidPackageSpec(String),

    // Execution errors
    #[error("Unknown command: {name}")]
    UnknownCommand { name: String, available: Vec<String> },

    #[error("No entry point declared by {package} (looked in {path})")]
    EntryMissing { package: String, path: PathBuf },

    #[error("Unknown loader '{name}' requested by {entry}")]
    UnknownLoader { name: String, entry: PathBuf },

    #[error("Failed to start {program}: {source}")]
    SpawnFailure {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid execution request: {0}")]
    InvalidRequest(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Home directory could not be determined")]
    HomeNotFound,

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a registry error
    pub fn registry(package: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Registry {
            package: package.into(),
            reason: reason.into(),
        }
    }

    /// Create an install error
    pub fn install(
        package: impl Into<String>,
        version: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Install {
            package: package.into(),
            version: version.into(),
            reason: reason.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::UnknownCommand { available, .. } if !available.is_empty() => {
                Some(format!("Available commands: {}", available.join(", ")))
            }
            Self::Registry { .. } => {
                Some("Check your network connection or the [registry] url in config".to_string())
            }
            Self::EntryMissing { .. } => {
                Some("The package must declare a \"main\" field in package.json".to_string())
            }
            Self::HomeNotFound => Some("Pass --home or set RELAY_HOME".to_string()),
            _ => None,
        }
    }
}
