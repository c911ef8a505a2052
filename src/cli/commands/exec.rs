//! Plugin commands - resolve, install and run the implementing package

use crate::config::{Config, Settings};
use crate::error::RelayResult;
use crate::exec::{CommandExecutor, CommandInvocation};
use crate::registry::{HttpRegistry, Registry, VersionResolver};
use crate::ui::UiContext;
use crate::update;
use std::sync::Arc;
use tracing::debug;

/// Run `invocation` and return the child's exit code
pub async fn execute(
    invocation: CommandInvocation,
    settings: Settings,
    config: &Config,
    update_check: bool,
) -> RelayResult<i32> {
    let registry: Arc<dyn Registry> = Arc::new(HttpRegistry::new(settings.registry_url.clone()));
    debug!("Using registry {}", registry.location());

    if wants_update_check(&settings, config, update_check) {
        let resolver = VersionResolver::new(Arc::clone(&registry));
        update::notify_if_outdated(&resolver, &config.general.self_package).await;
    }

    let executor = CommandExecutor::new(settings, registry, UiContext::detect());
    executor.execute(&invocation).await
}

/// Local mode (`--target-path`) stays offline
fn wants_update_check(settings: &Settings, config: &Config, requested: bool) -> bool {
    requested && config.general.update_check && settings.target_path.is_none()
}
