//! Command orchestration
//!
//! ```text
//! ResolveTarget -> EnsurePackage -> LocateEntry -> Spawn -> AwaitExit
//! ```
//!
//! `EnsurePackage` only runs in managed-cache mode; a configured target
//! path is used as-is.

use super::launcher::{self, LoaderTable};
use super::request::{CommandInvocation, ExecutionRequest};
use crate::config::Settings;
use crate::error::{RelayError, RelayResult};
use crate::package::{EntryLocator, PackageCache, PackageInstaller, PackageSpec, LATEST};
use crate::registry::{Registry, VersionResolver};
use crate::ui::{TaskSpinner, UiContext};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Orchestration stage, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ResolveTarget,
    EnsurePackage,
    LocateEntry,
    Spawn,
    AwaitExit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ResolveTarget => "resolve-target",
            Self::EnsurePackage => "ensure-package",
            Self::LocateEntry => "locate-entry",
            Self::Spawn => "spawn",
            Self::AwaitExit => "await-exit",
        };
        write!(f, "{}", name)
    }
}

/// Runs plugin-implemented commands
pub struct CommandExecutor {
    settings: Settings,
    installer: PackageInstaller,
    loaders: LoaderTable,
    ui: UiContext,
}

impl CommandExecutor {
    pub fn new(settings: Settings, registry: Arc<dyn Registry>, ui: UiContext) -> Self {
        let installer = PackageInstaller::new(PackageCache::new(VersionResolver::new(registry)));
        let loaders = LoaderTable::with_overrides(&settings.loaders);
        Self {
            settings,
            installer,
            loaders,
            ui,
        }
    }

    /// Run `invocation` and return the exit code to finish with
    pub async fn execute(&self, invocation: &CommandInvocation) -> RelayResult<i32> {
        debug!(stage = %Stage::ResolveTarget, "Resolving command {}", invocation.name);
        let mut spec = self.resolve_target(&invocation.name)?;

        if spec.is_managed() {
            debug!(stage = %Stage::EnsurePackage, "Ensuring {} is installed", spec.name);
            self.ensure_package(&mut spec).await?;
        }

        debug!(stage = %Stage::LocateEntry, "Looking for entry in {}", spec.package_dir().display());
        let entry = EntryLocator::entry_point(&spec).ok_or_else(|| RelayError::EntryMissing {
            package: spec.name.clone(),
            path: spec.package_dir(),
        })?;

        debug!(stage = %Stage::Spawn, "Entry point {}", entry.path.display());
        let loader = self.loaders.loader_for(&entry)?;
        let request = ExecutionRequest::new(invocation, entry.path);

        debug!(stage = %Stage::AwaitExit, "Running {} via {}", request.command, loader.name);
        launcher::launch(&loader, &request).await
    }

    /// Build the package spec for `command` in the mode the settings select
    pub fn resolve_target(&self, command: &str) -> RelayResult<PackageSpec> {
        let package = self
            .settings
            .commands
            .package_for(command)
            .ok_or_else(|| RelayError::UnknownCommand {
                name: command.to_string(),
                available: self.settings.commands.names(),
            })?;

        match self.settings.target_path {
            Some(ref target) => {
                debug!("Using local package at {}", target.display());
                PackageSpec::local(package, target)
            }
            None => PackageSpec::managed(
                package,
                LATEST,
                self.settings.dependencies_dir(),
                self.settings.store_dir(),
            ),
        }
    }

    /// Install when missing, otherwise refresh to the latest version
    async fn ensure_package(&self, spec: &mut PackageSpec) -> RelayResult<()> {
        if self.installer.cache().exists(spec).await? {
            if self.installer.update(spec).await? {
                info!("Updated {} to {}", spec.name, spec.version);
            }
            return Ok(());
        }

        let mut spinner = TaskSpinner::new(&self.ui);
        spinner.start(&format!("Installing {}@{}...", spec.name, spec.version));
        match self.installer.install(spec).await {
            Ok(_) => {
                spinner.stop(&format!("Installed {}@{}", spec.name, spec.version));
                Ok(())
            }
            Err(e) => {
                spinner.stop_error(&format!("Failed to install {}", spec.name));
                Err(e)
            }
        }
    }
}
