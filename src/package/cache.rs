//! Version-keyed package cache

use super::PackageSpec;
use crate::error::{RelayError, RelayResult};
use crate::registry::{compare_versions, VersionResolver};
use chrono::{DateTime, Utc};
use semver::Version;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Cache entry directory for `name@version` inside `store_dir`
pub fn cache_entry_path(store_dir: &Path, name: &str, version: &str) -> PathBuf {
    let sanitized = name.replace(['/', '\\'], "_");
    store_dir.join(format!("_{}@{}@{}", sanitized, version, name))
}

/// An installed package found in the store
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntry {
    pub name: String,
    pub version: String,
    pub path: PathBuf,
    pub installed_at: Option<DateTime<Utc>>,
}

/// Split `_{sanitized}@{version}@{name}` into `(version, name)`.
///
/// For scoped packages `name` is only the `@scope` part; the package
/// directory sits one level below.
fn parse_entry_dir(dir_name: &str) -> Option<(&str, &str)> {
    let rest = dir_name.strip_prefix('_')?;
    let skip = usize::from(rest.starts_with('@'));
    let after_sanitized = rest[skip..].find('@')? + skip + 1;
    let (version, name) = rest[after_sanitized..].split_once('@')?;
    (!version.is_empty() && !name.is_empty()).then_some((version, name))
}

/// Every package installed under `store_dir`, sorted by name then version.
/// A missing store yields an empty list.
pub fn list_entries(store_dir: &Path) -> RelayResult<Vec<CacheEntry>> {
    let read = match fs::read_dir(store_dir) {
        Ok(read) => read,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(RelayError::io(format!("reading {}", store_dir.display()), e)),
    };

    let mut entries = Vec::new();
    for dir in read.flatten() {
        let dir_name = dir.file_name().to_string_lossy().into_owned();
        let Some((version, name)) = parse_entry_dir(&dir_name) else {
            continue;
        };

        if name.starts_with('@') {
            for package in fs::read_dir(dir.path()).into_iter().flatten().flatten() {
                let full_name = format!("{}/{}", name, package.file_name().to_string_lossy());
                entries.push(entry(full_name, version, package.path()));
            }
        } else {
            entries.push(entry(name.to_string(), version, dir.path()));
        }
    }

    entries.sort_by(|a, b| {
        a.name.cmp(&b.name).then_with(|| {
            match (Version::parse(&a.version), Version::parse(&b.version)) {
                (Ok(left), Ok(right)) => compare_versions(&left, &right),
                _ => a.version.cmp(&b.version),
            }
        })
    });
    Ok(entries)
}

fn entry(name: String, version: &str, path: PathBuf) -> CacheEntry {
    let installed_at = fs::metadata(&path)
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::<Utc>::from);
    CacheEntry {
        name,
        version: version.to_string(),
        path,
        installed_at,
    }
}

/// Answers "is this package installed?"
#[derive(Clone)]
pub struct PackageCache {
    resolver: VersionResolver,
}

impl PackageCache {
    pub fn new(resolver: VersionResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &VersionResolver {
        &self.resolver
    }

    /// Replace a `latest` version with the registry's highest version.
    ///
    /// Mutates `spec.version`; a no-op once the version is concrete.
    pub async fn resolve_version(&self, spec: &mut PackageSpec) -> RelayResult<()> {
        if spec.is_latest() {
            let version = self.resolver.require_latest(&spec.name).await?;
            debug!("Resolved {}@latest to {}", spec.name, version);
            spec.version = version;
        }
        Ok(())
    }

    /// Whether the package content is present on disk.
    ///
    /// Managed packages resolve `latest` first (mutating `spec.version`) and
    /// check their cache entry; local packages check the target path.
    pub async fn exists(&self, spec: &mut PackageSpec) -> RelayResult<bool> {
        let path = if spec.is_managed() {
            self.resolve_version(spec).await?;
            spec.package_dir()
        } else {
            spec.target_path.clone()
        };

        let present = tokio::fs::try_exists(&path)
            .await
            .map_err(|e| RelayError::io(format!("checking {}", path.display()), e))?;
        debug!("{} present: {}", path.display(), present);
        Ok(present)
    }
}
