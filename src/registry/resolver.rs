//! Version selection over a registry's published versions
//!
//! Every sort goes through [`compare_versions`], a three-way semver
//! precedence comparator. Entries that are not valid semver are ignored.

use super::Registry;
use crate::error::{RelayError, RelayResult};
use semver::{Version, VersionReq};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

/// Semver precedence: major, minor, patch, then prerelease.
///
/// A version with a prerelease sorts below the same version without one;
/// build metadata does not participate.
pub fn compare_versions(a: &Version, b: &Version) -> Ordering {
    a.major
        .cmp(&b.major)
        .then(a.minor.cmp(&b.minor))
        .then(a.patch.cmp(&b.patch))
        .then_with(|| match (a.pre.is_empty(), b.pre.is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => a.pre.cmp(&b.pre),
        })
}

/// Parse the valid versions out of a registry version set
fn parse_all(versions: &[String]) -> Vec<Version> {
    versions
        .iter()
        .filter_map(|v| match Version::parse(v) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!("Skipping unparseable version {}: {}", v, e);
                None
            }
        })
        .collect()
}

/// Highest version by precedence, prereleases included
pub fn pick_latest(versions: &[String]) -> Option<String> {
    parse_all(versions)
        .into_iter()
        .max_by(compare_versions)
        .map(|v| v.to_string())
}

/// Highest version matching `^base`
pub fn pick_satisfying(versions: &[String], base: &str) -> RelayResult<Option<String>> {
    let req = VersionReq::parse(&format!("^{}", base.trim_start_matches('v')))
        .map_err(|e| RelayError::InvalidPackageSpec(format!("bad base version {}: {}", base, e)))?;

    let mut matching: Vec<Version> = parse_all(versions)
        .into_iter()
        .filter(|v| req.matches(v))
        .collect();
    matching.sort_by(|a, b| compare_versions(b, a));

    Ok(matching.first().map(|v| v.to_string()))
}

/// Resolves concrete versions against a registry
#[derive(Clone)]
pub struct VersionResolver {
    registry: Arc<dyn Registry>,
}

impl VersionResolver {
    /// Create a resolver backed by `registry`
    pub fn new(registry: Arc<dyn Registry>) -> Self {
        Self { registry }
    }

    /// The registry this resolver queries
    pub fn registry(&self) -> &Arc<dyn Registry> {
        &self.registry
    }

    /// All published version strings; empty when the registry has no record
    pub async fn list_versions(&self, name: &str) -> RelayResult<Vec<String>> {
        let versions = match self.registry.fetch_package(name).await? {
            Some(doc) => doc.versions.into_keys().collect(),
            None => Vec::new(),
        };
        debug!("{} has {} published versions", name, versions.len());
        Ok(versions)
    }

    /// Highest published version
    pub async fn latest(&self, name: &str) -> RelayResult<Option<String>> {
        let versions = self.list_versions(name).await?;
        Ok(pick_latest(&versions))
    }

    /// Highest published version within the caret range of `base`
    pub async fn satisfying(&self, name: &str, base: &str) -> RelayResult<Option<String>> {
        let versions = self.list_versions(name).await?;
        pick_satisfying(&versions, base)
    }

    /// Like [`latest`](Self::latest) but an empty version set is an error
    pub async fn require_latest(&self, name: &str) -> RelayResult<String> {
        self.latest(name)
            .await?
            .ok_or_else(|| RelayError::NoVersions(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::testing::MemoryRegistry;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn compare_is_three_way() {
        let cases = [
            ("1.0.0", "1.0.0", Ordering::Equal),
            ("1.0.0", "1.2.0", Ordering::Less),
            ("1.2.0", "1.1.0", Ordering::Greater),
            ("1.10.0", "1.9.0", Ordering::Greater),
            ("2.0.0-beta.1", "2.0.0", Ordering::Less),
            ("2.0.0-beta.1", "1.9.9", Ordering::Greater),
            ("2.0.0-alpha", "2.0.0-beta", Ordering::Less),
            ("2.0.0-beta.2", "2.0.0-beta.11", Ordering::Less),
            ("1.0.0+build.1", "1.0.0+build.2", Ordering::Equal),
        ];

        for (a, b, expected) in cases {
            assert_eq!(compare_versions(&v(a), &v(b)), expected, "{} vs {}", a, b);
            assert_eq!(
                compare_versions(&v(b), &v(a)),
                expected.reverse(),
                "{} vs {} (reversed)",
                b,
                a
            );
        }
    }

    #[test]
    fn latest_picks_max_precedence() {
        assert_eq!(
            pick_latest(&strings(&["1.0.0", "1.2.0", "1.1.0"])).as_deref(),
            Some("1.2.0")
        );
    }

    #[test]
    fn latest_is_independent_of_input_order() {
        let mut versions = strings(&["0.9.0", "1.10.0", "1.2.0", "1.9.3", "1.1.0"]);
        let expected = Some("1.10.0".to_string());
        for _ in 0..versions.len() {
            versions.rotate_left(1);
            assert_eq!(pick_latest(&versions), expected);
            let reversed: Vec<String> = versions.iter().rev().cloned().collect();
            assert_eq!(pick_latest(&reversed), expected);
        }
    }

    #[test]
    fn latest_includes_prereleases_by_precedence() {
        assert_eq!(
            pick_latest(&strings(&["1.9.0", "2.0.0-beta.1"])).as_deref(),
            Some("2.0.0-beta.1")
        );
        assert_eq!(
            pick_latest(&strings(&["2.0.0-beta.1", "2.0.0", "1.9.0"])).as_deref(),
            Some("2.0.0")
        );
    }

    #[test]
    fn latest_of_nothing_is_none() {
        assert_eq!(pick_latest(&[]), None);
        assert_eq!(pick_latest(&strings(&["not-a-version"])), None);
    }

    #[test]
    fn satisfying_stays_within_major() {
        assert_eq!(
            pick_satisfying(&strings(&["3.9.0", "4.0.0", "4.1.0", "5.0.0"]), "4.0.0")
                .unwrap()
                .as_deref(),
            Some("4.1.0")
        );
    }

    #[test]
    fn satisfying_excludes_prereleases_of_other_versions() {
        assert_eq!(
            pick_satisfying(&strings(&["4.0.1", "4.1.0-rc.1"]), "4.0.0")
                .unwrap()
                .as_deref(),
            Some("4.0.1")
        );
    }

    #[test]
    fn satisfying_prerelease_base_admits_same_triple_prereleases() {
        assert_eq!(
            pick_satisfying(&strings(&["4.0.0-rc.1", "4.0.0-rc.2"]), "4.0.0-rc.1")
                .unwrap()
                .as_deref(),
            Some("4.0.0-rc.2")
        );
    }

    #[test]
    fn satisfying_below_base_is_none() {
        assert_eq!(
            pick_satisfying(&strings(&["1.0.0", "1.1.0"]), "1.2.0").unwrap(),
            None
        );
    }

    #[test]
    fn satisfying_rejects_invalid_base() {
        assert!(pick_satisfying(&strings(&["1.0.0"]), "one").is_err());
    }

    #[tokio::test]
    async fn resolver_queries_registry() {
        let registry = MemoryRegistry::new();
        registry.publish_versions("pkg", &["3.9.0", "4.0.0", "4.1.0", "5.0.0"]);
        let resolver = VersionResolver::new(Arc::new(registry));

        assert_eq!(resolver.latest("pkg").await.unwrap().as_deref(), Some("5.0.0"));
        assert_eq!(
            resolver.satisfying("pkg", "4.0.0").await.unwrap().as_deref(),
            Some("4.1.0")
        );
    }

    #[tokio::test]
    async fn unknown_package_has_no_versions() {
        let resolver = VersionResolver::new(Arc::new(MemoryRegistry::new()));

        assert!(resolver.list_versions("missing").await.unwrap().is_empty());
        assert!(resolver.latest("missing").await.unwrap().is_none());
        assert!(matches!(
            resolver.require_latest("missing").await,
            Err(RelayError::NoVersions(_))
        ));
    }

    #[tokio::test]
    async fn registry_failure_propagates() {
        let registry = MemoryRegistry::new();
        registry.fail_with("HTTP 503");
        let resolver = VersionResolver::new(Arc::new(registry));

        assert!(matches!(
            resolver.latest("pkg").await,
            Err(RelayError::Registry { .. })
        ));
    }
}
