//! HTTP registry client
//!
//! `ureq` is blocking, so every request runs on the blocking pool.

use super::{PackageDocument, Registry};
use crate::error::{RelayError, RelayResult};
use async_trait::async_trait;
use tracing::debug;
use ureq::Agent;

/// Upper bound for a package document (large packages publish thousands of versions)
const MAX_DOCUMENT_BYTES: u64 = 64 * 1024 * 1024;

/// Upper bound for a package tarball
const MAX_TARBALL_BYTES: u64 = 256 * 1024 * 1024;

/// Registry reached over HTTP(S)
#[derive(Clone)]
pub struct HttpRegistry {
    base_url: String,
    agent: Agent,
}

impl HttpRegistry {
    /// Create a client for `base_url` (e.g. `https://registry.npmjs.org`)
    pub fn new(base_url: impl Into<String>) -> Self {
        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            agent,
        }
    }

    /// URL of the package document for `name`
    pub fn package_url(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }
}

#[async_trait]
impl Registry for HttpRegistry {
    async fn fetch_package(&self, name: &str) -> RelayResult<Option<PackageDocument>> {
        let url = self.package_url(name);
        let agent = self.agent.clone();
        let package = name.to_string();
        debug!("GET {}", url);

        let body = tokio::task::spawn_blocking(move || -> RelayResult<Option<String>> {
            let mut response = agent
                .get(&url)
                .header("Accept", "application/json")
                .call()
                .map_err(|e| RelayError::registry(&package, e.to_string()))?;

            match response.status().as_u16() {
                200 => response
                    .body_mut()
                    .with_config()
                    .limit(MAX_DOCUMENT_BYTES)
                    .read_to_string()
                    .map(Some)
                    .map_err(|e| RelayError::registry(&package, e.to_string())),
                404 => Ok(None),
                status => Err(RelayError::registry(&package, format!("HTTP {}", status))),
            }
        })
        .await
        .map_err(|e| RelayError::Internal(format!("registry task failed: {}", e)))??;

        match body {
            Some(body) => serde_json::from_str(&body)
                .map(Some)
                .map_err(|e| RelayError::registry(name, format!("malformed document: {}", e))),
            None => Ok(None),
        }
    }

    async fn download(&self, package: &str, url: &str) -> RelayResult<Vec<u8>> {
        let agent = self.agent.clone();
        let url = url.to_string();
        let package = package.to_string();
        debug!("Downloading {}", url);

        tokio::task::spawn_blocking(move || {
            let mut response = agent
                .get(&url)
                .call()
                .map_err(|e| RelayError::registry(&package, e.to_string()))?;

            let status = response.status().as_u16();
            if status != 200 {
                return Err(RelayError::registry(
                    &package,
                    format!("HTTP {} downloading {}", status, url),
                ));
            }

            response
                .body_mut()
                .with_config()
                .limit(MAX_TARBALL_BYTES)
                .read_to_vec()
                .map_err(|e| RelayError::registry(&package, e.to_string()))
        })
        .await
        .map_err(|e| RelayError::Internal(format!("download task failed: {}", e)))?
    }

    fn location(&self) -> &str {
        &self.base_url
    }
}
