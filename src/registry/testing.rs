//! In-memory registry and tarball builders for tests

use super::{Dist, PackageDocument, Registry, VersionManifest};
use crate::error::{RelayError, RelayResult};
use async_trait::async_trait;
use base64::Engine;
use flate2::write::GzEncoder;
use flate2::Compression;
use sha2::{Digest, Sha512};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Registry backed by a map; tarballs are served from memory
#[derive(Default)]
pub struct MemoryRegistry {
    packages: Mutex<HashMap<String, PackageDocument>>,
    tarballs: Mutex<HashMap<String, Vec<u8>>>,
    failure: Mutex<Option<String>>,
    downloads: AtomicUsize,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish bare versions with no tarballs
    pub fn publish_versions(&self, name: &str, versions: &[&str]) {
        let mut packages = self.packages.lock().unwrap();
        let doc = packages.entry(name.to_string()).or_default();
        for version in versions {
            doc.versions
                .insert(version.to_string(), VersionManifest::default());
        }
    }

    /// Publish a version backed by `tarball`, with a matching sha512 integrity
    pub fn publish(&self, name: &str, version: &str, tarball: Vec<u8>) {
        let integrity = sri_sha512(&tarball);
        self.publish_with_integrity(name, version, tarball, Some(integrity));
    }

    /// Publish a version with an explicit (possibly wrong) integrity
    pub fn publish_with_integrity(
        &self,
        name: &str,
        version: &str,
        tarball: Vec<u8>,
        integrity: Option<String>,
    ) {
        let url = format!("memory://{}/-/{}.tgz", name, version);
        self.tarballs.lock().unwrap().insert(url.clone(), tarball);
        self.packages
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_default()
            .versions
            .insert(
                version.to_string(),
                VersionManifest {
                    dist: Some(Dist {
                        tarball: url,
                        integrity,
                    }),
                },
            );
    }

    /// Make every subsequent lookup fail
    pub fn fail_with(&self, reason: &str) {
        *self.failure.lock().unwrap() = Some(reason.to_string());
    }

    /// Number of tarballs downloaded so far
    pub fn download_count(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Registry for MemoryRegistry {
    async fn fetch_package(&self, name: &str) -> RelayResult<Option<PackageDocument>> {
        if let Some(reason) = self.failure.lock().unwrap().clone() {
            return Err(RelayError::registry(name, reason));
        }
        Ok(self.packages.lock().unwrap().get(name).cloned())
    }

    async fn download(&self, package: &str, url: &str) -> RelayResult<Vec<u8>> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        self.tarballs
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| RelayError::registry(package, format!("no tarball at {}", url)))
    }

    fn location(&self) -> &str {
        "memory"
    }
}

/// `sha512-<base64>` integrity string for `bytes`
pub fn sri_sha512(bytes: &[u8]) -> String {
    let digest = Sha512::digest(bytes);
    format!(
        "sha512-{}",
        base64::engine::general_purpose::STANDARD.encode(digest)
    )
}

/// Build a gzipped tarball with every file under the conventional `package/` folder.
/// Entries are `(path, contents, mode)`.
pub fn tarball(files: &[(&str, &str, u32)]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for (path, contents, mode) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(*mode);
        header.set_cksum();
        builder
            .append_data(&mut header, format!("package/{}", path), contents.as_bytes())
            .unwrap();
    }

    builder.into_inner().unwrap().finish().unwrap()
}

/// Tarball for a package whose `main` is `entry`
pub fn package_tarball(name: &str, version: &str, entry: &str, entry_body: &str) -> Vec<u8> {
    let descriptor = format!(
        r#"{{"name":"{}","version":"{}","main":"{}"}}"#,
        name, version, entry
    );
    tarball(&[
        ("package.json", descriptor.as_str(), 0o644),
        (entry, entry_body, 0o755),
    ])
}
