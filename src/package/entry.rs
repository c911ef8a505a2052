//! Entry point lookup via the package descriptor

use super::PackageSpec;
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Descriptor file name
pub const DESCRIPTOR_FILE: &str = "package.json";

/// The `package.json` fields relay reads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    /// Entry file relative to the descriptor's directory
    #[serde(default)]
    pub main: Option<String>,
    /// relay-specific settings
    #[serde(default)]
    pub relay: Option<RelayField>,
}

/// `"relay": { ... }` block of a descriptor
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelayField {
    /// Loader name that runs the entry (overrides extension detection)
    #[serde(default)]
    pub runtime: Option<String>,
}

/// A located entry point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    /// Absolute, normalized entry file
    pub path: PathBuf,
    /// Loader requested by the descriptor
    pub runtime: Option<String>,
}

/// Finds the file a package declares as its entry point
pub struct EntryLocator;

impl EntryLocator {
    /// Entry file of `spec`, or `None` when nothing is declared
    pub fn root_file_path(spec: &PackageSpec) -> Option<PathBuf> {
        Self::entry_point(spec).map(|entry| entry.path)
    }

    /// Entry file plus the descriptor's loader preference
    pub fn entry_point(spec: &PackageSpec) -> Option<EntryPoint> {
        Self::from_dir(&spec.package_dir())
    }

    /// Search `start` and its ancestors for the nearest descriptor
    pub fn from_dir(start: &Path) -> Option<EntryPoint> {
        let start = absolute(start)?;
        if !start.exists() {
            debug!("{} does not exist", start.display());
            return None;
        }

        let dir = start
            .ancestors()
            .find(|dir| dir.join(DESCRIPTOR_FILE).is_file())?;
        let descriptor = read_descriptor(&dir.join(DESCRIPTOR_FILE))?;

        let main = descriptor.main.filter(|m| !m.trim().is_empty())?;
        let path = normalize(&dir.join(main));
        debug!("Entry point: {}", path.display());

        Some(EntryPoint {
            path,
            runtime: descriptor.relay.and_then(|r| r.runtime),
        })
    }
}

fn read_descriptor(path: &Path) -> Option<PackageDescriptor> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| debug!("Cannot read {}: {}", path.display(), e))
        .ok()?;
    serde_json::from_str(&content)
        .map_err(|e| debug!("Malformed {}: {}", path.display(), e))
        .ok()
}

fn absolute(path: &Path) -> Option<PathBuf> {
    if path.is_absolute() {
        Some(path.to_path_buf())
    } else {
        std::env::current_dir().ok().map(|cwd| cwd.join(path))
    }
}

/// Lexically remove `.` and `..` components
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
