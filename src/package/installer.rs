//! Install and update packages in the managed cache

use super::archive::{install_tarball, verify_integrity};
use super::{cache_entry_path, PackageCache, PackageSpec};
use crate::error::{RelayError, RelayResult};
use crate::registry::Dist;
use std::path::PathBuf;
use tracing::{debug, info};
use uuid::Uuid;

/// Drives registry downloads into the cache
#[derive(Clone)]
pub struct PackageInstaller {
    cache: PackageCache,
}

impl PackageInstaller {
    pub fn new(cache: PackageCache) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &PackageCache {
        &self.cache
    }

    /// Install `spec` into its cache entry and return the entry path.
    ///
    /// Resolves `latest` first (mutating `spec.version`). On failure the
    /// entry is not created; callers should re-check `exists` rather than
    /// assume anything about the cache.
    pub async fn install(&self, spec: &mut PackageSpec) -> RelayResult<PathBuf> {
        let store = spec.require_store()?.to_path_buf();
        tokio::fs::create_dir_all(&store).await.map_err(|e| {
            RelayError::install(
                &spec.name,
                &spec.version,
                format!("creating {}: {}", store.display(), e),
            )
        })?;

        self.cache.resolve_version(spec).await?;
        let dest = cache_entry_path(&store, &spec.name, &spec.version);
        info!("Installing {}@{}", spec.name, spec.version);

        let dist = self.dist_for(&spec.name, &spec.version).await?;
        let registry = self.cache.resolver().registry();
        let bytes = registry
            .download(&spec.name, &dist.tarball)
            .await
            .map_err(|e| RelayError::install(&spec.name, &spec.version, e.to_string()))?;
        debug!("Downloaded {} bytes from {}", bytes.len(), dist.tarball);

        if let Some(ref integrity) = dist.integrity {
            if !verify_integrity(&bytes, integrity) {
                return Err(RelayError::Integrity {
                    package: spec.name.clone(),
                    version: spec.version.clone(),
                });
            }
        }

        let staging = store.join(format!(".staging-{}", Uuid::new_v4()));
        let target = dest.clone();
        tokio::task::spawn_blocking(move || install_tarball(&bytes, &staging, &target))
            .await
            .map_err(|e| RelayError::Internal(format!("install task failed: {}", e)))?
            .map_err(|e| RelayError::install(&spec.name, &spec.version, e.to_string()))?;

        info!("Installed {}@{} to {}", spec.name, spec.version, dest.display());
        Ok(dest)
    }

    /// Make sure the registry's latest version is cached.
    ///
    /// Installs it and moves `spec.version` to it when its entry is missing;
    /// otherwise does nothing. Returns whether an install happened.
    pub async fn update(&self, spec: &mut PackageSpec) -> RelayResult<bool> {
        let store = spec.require_store()?.to_path_buf();
        let latest = self.cache.resolver().require_latest(&spec.name).await?;

        if cache_entry_path(&store, &spec.name, &latest).exists() {
            debug!("{}@{} already cached", spec.name, latest);
            return Ok(false);
        }

        let mut next = spec.clone();
        next.version = latest;
        self.install(&mut next).await?;
        spec.version = next.version;
        Ok(true)
    }

    /// Distribution info for one published version
    async fn dist_for(&self, name: &str, version: &str) -> RelayResult<Dist> {
        let doc = self
            .cache
            .resolver()
            .registry()
            .fetch_package(name)
            .await?
            .ok_or_else(|| RelayError::NoVersions(name.to_string()))?;

        doc.versions
            .get(version)
            .and_then(|manifest| manifest.dist.clone())
            .ok_or_else(|| RelayError::VersionNotFound {
                package: name.to_string(),
                version: version.to_string(),
            })
    }
}
