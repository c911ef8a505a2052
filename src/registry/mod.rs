//! Package registry access
//!
//! Talks to an npm-compatible registry: one JSON document per package at
//! `{registry}/{name}`, whose `versions` object is keyed by semver strings.
//! Version selection on top of the raw document lives in [`resolver`].

mod http;
pub mod resolver;
#[cfg(test)]
pub(crate) mod testing;

pub use http::HttpRegistry;
pub use resolver::{compare_versions, VersionResolver};

use crate::error::RelayResult;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Registry document for one package (only the fields relay reads)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageDocument {
    /// Published versions keyed by version string
    #[serde(default)]
    pub versions: BTreeMap<String, VersionManifest>,
}

/// Per-version metadata
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VersionManifest {
    /// Distribution info; absent for unpublished or malformed entries
    #[serde(default)]
    pub dist: Option<Dist>,
}

/// Where to download a version and how to verify it
#[derive(Debug, Clone, Deserialize)]
pub struct Dist {
    /// Tarball URL
    pub tarball: String,
    /// Subresource integrity string, e.g. `sha512-<base64>`
    #[serde(default)]
    pub integrity: Option<String>,
}

/// Transport to a package registry
#[async_trait]
pub trait Registry: Send + Sync {
    /// Fetch the package document. `Ok(None)` when the registry has no record.
    async fn fetch_package(&self, name: &str) -> RelayResult<Option<PackageDocument>>;

    /// Download a tarball for `package`
    async fn download(&self, package: &str, url: &str) -> RelayResult<Vec<u8>>;

    /// Human-readable registry location for logs
    fn location(&self) -> &str;
}
