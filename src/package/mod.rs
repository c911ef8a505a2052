//! Plugin packages: cache layout, installation and entry lookup
//!
//! A package is either *managed* (installed into a version-keyed cache
//! under a store directory) or *local* (an explicit target path that is
//! used as-is and never installed into).
//!
//! # Cache layout
//!
//! ```text
//! {store}/_{sanitized-name}@{version}@{name}/package.json
//! ```
//!
//! `sanitized-name` replaces path separators so scoped names such as
//! `@scope/name` yield one directory prefix per package. Entries are never
//! deleted by relay; a new version lands in a new directory.

mod archive;
pub mod cache;
pub mod entry;
pub mod installer;

pub use cache::{cache_entry_path, list_entries, CacheEntry, PackageCache};
pub use entry::{EntryLocator, PackageDescriptor};
pub use installer::PackageInstaller;

use crate::error::{RelayError, RelayResult};
use std::path::{Path, PathBuf};

/// Version sentinel resolved to the highest published version
pub const LATEST: &str = "latest";

/// A package requested by one relay invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    /// Registry name, possibly scoped (`@scope/name`)
    pub name: String,
    /// Concrete version, or [`LATEST`] until resolved
    pub version: String,
    /// Install root (managed mode) or the package itself (local mode)
    pub target_path: PathBuf,
    /// Cache store directory; `None` selects local mode
    pub store_dir: Option<PathBuf>,
}

impl PackageSpec {
    /// Package served from the managed cache under `store_dir`
    pub fn managed(
        name: impl Into<String>,
        version: impl Into<String>,
        target_path: impl Into<PathBuf>,
        store_dir: impl Into<PathBuf>,
    ) -> RelayResult<Self> {
        Self::build(name.into(), version.into(), target_path.into(), Some(store_dir.into()))
    }

    /// Package read directly from `target_path`
    pub fn local(name: impl Into<String>, target_path: impl Into<PathBuf>) -> RelayResult<Self> {
        Self::build(name.into(), LATEST.to_string(), target_path.into(), None)
    }

    fn build(
        name: String,
        version: String,
        target_path: PathBuf,
        store_dir: Option<PathBuf>,
    ) -> RelayResult<Self> {
        if name.trim().is_empty() {
            return Err(RelayError::InvalidPackageSpec(
                "package name must not be empty".to_string(),
            ));
        }
        if version.trim().is_empty() {
            return Err(RelayError::InvalidPackageSpec(format!(
                "version of {} must not be empty",
                name
            )));
        }
        Ok(Self {
            name,
            version,
            target_path,
            store_dir,
        })
    }

    /// Whether the version still needs resolving
    pub fn is_latest(&self) -> bool {
        self.version == LATEST
    }

    /// Whether this package lives in the managed cache
    pub fn is_managed(&self) -> bool {
        self.store_dir.is_some()
    }

    /// Cache entry for the current version (managed mode only)
    pub fn cache_path(&self) -> Option<PathBuf> {
        self.store_dir
            .as_deref()
            .map(|store| cache_entry_path(store, &self.name, &self.version))
    }

    /// Directory holding the package content
    pub fn package_dir(&self) -> PathBuf {
        self.cache_path()
            .unwrap_or_else(|| self.target_path.clone())
    }

    /// Store directory, or an error for local packages
    pub(crate) fn require_store(&self) -> RelayResult<&Path> {
        self.store_dir.as_deref().ok_or_else(|| {
            RelayError::InvalidPackageSpec(format!(
                "{} is a local package and cannot be installed",
                self.name
            ))
        })
    }
}
