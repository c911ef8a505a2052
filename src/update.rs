//! Newer-release notice for relay itself

use crate::error::RelayResult;
use crate::registry::VersionResolver;
use semver::Version;
use tracing::{debug, warn};

/// Version of this build
pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Highest published release compatible with `current` (caret range),
/// when it is newer than `current`
pub async fn newer_release(
    resolver: &VersionResolver,
    package: &str,
    current: &str,
) -> RelayResult<Option<String>> {
    let Some(candidate) = resolver.satisfying(package, current).await? else {
        return Ok(None);
    };

    let newer = match (Version::parse(&candidate), Version::parse(current)) {
        (Ok(candidate), Ok(current)) => candidate > current,
        _ => false,
    };
    Ok(newer.then_some(candidate))
}

/// Log a warning when a newer relay is published. Never fails.
pub async fn notify_if_outdated(resolver: &VersionResolver, package: &str) {
    match newer_release(resolver, package, CURRENT_VERSION).await {
        Ok(Some(latest)) => warn!(
            "relay {} is available (current: {}). Update with: npm i -g {}",
            latest, CURRENT_VERSION, package
        ),
        Ok(None) => debug!("relay {} is up to date", CURRENT_VERSION),
        Err(e) => debug!("Update check failed: {}", e),
    }
}
