//! Directory of provider name to plugin implementation.
//!
//! The registry is built once during process start-up by explicit
//! [`PluginRegistry::register`] calls and then shared read-mostly across
//! request handlers.

use crate::plugin::{
    domain::{Deadline, PluginHealthReport, PluginName},
    ports::{PluginError, ProvisioningPlugin},
};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use thiserror::Error;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors returned by [`PluginRegistry`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A plugin with the same name is already registered.
    #[error("plugin '{0}' already registered")]
    DuplicatePlugin(PluginName),

    /// No plugin is registered under the requested name.
    #[error("plugin not found: {0}")]
    PluginNotFound(String),
}

/// Concurrent-safe map from plugin name to implementation.
///
/// Registrations are additive: there is no removal and no overwrite.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: RwLock<HashMap<PluginName, Arc<dyn ProvisioningPlugin>>>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a plugin under its own [`ProvisioningPlugin::name`].
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicatePlugin`] when the name is taken. The
    /// existing registration is left untouched.
    pub fn register(&self, plugin: Arc<dyn ProvisioningPlugin>) -> RegistryResult<()> {
        let name = plugin.name().clone();
        let mut plugins = self.write();
        if plugins.contains_key(&name) {
            return Err(RegistryError::DuplicatePlugin(name));
        }
        tracing::debug!(plugin = %name, "plugin registered");
        plugins.insert(name, plugin);
        Ok(())
    }

    /// Looks up a plugin by name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::PluginNotFound`] carrying the requested name
    /// when nothing is registered under it.
    pub fn get(&self, name: &str) -> RegistryResult<Arc<dyn ProvisioningPlugin>> {
        self.read()
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::PluginNotFound(name.to_owned()))
    }

    /// Returns every registered plugin. Order is not meaningful.
    #[must_use]
    pub fn list(&self) -> Vec<Arc<dyn ProvisioningPlugin>> {
        self.read().values().cloned().collect()
    }

    /// Returns the registered plugin names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<PluginName> {
        let mut names: Vec<PluginName> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns the number of registered plugins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns `true` when no plugin is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Checks every registered plugin concurrently.
    ///
    /// Each check gets its own deadline `timeout` from now. Reports are
    /// sorted by plugin name.
    pub async fn check_health(&self, timeout: Duration) -> Vec<PluginHealthReport> {
        let checks: Vec<_> = self
            .list()
            .into_iter()
            .map(|plugin| tokio::spawn(check_plugin(plugin, timeout)))
            .collect();

        let mut reports = Vec::with_capacity(checks.len());
        for check in checks {
            match check.await {
                Ok(report) => reports.push(report),
                Err(err) => tracing::error!(error = %err, "plugin health check panicked"),
            }
        }
        reports.sort_by(|left, right| left.plugin().cmp(right.plugin()));
        reports
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<PluginName, Arc<dyn ProvisioningPlugin>>> {
        self.plugins.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<PluginName, Arc<dyn ProvisioningPlugin>>> {
        self.plugins.write().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn check_plugin(plugin: Arc<dyn ProvisioningPlugin>, timeout: Duration) -> PluginHealthReport {
    let deadline = Deadline::after(timeout);
    let name = plugin.name().clone();
    let outcome = deadline
        .run(plugin.health(deadline))
        .await
        .map_err(PluginError::on_elapsed("health"))
        .and_then(std::convert::identity);
    match outcome {
        Ok(()) => PluginHealthReport::healthy(name, Utc::now()),
        Err(err) => {
            tracing::warn!(plugin = %name, error = %err, "plugin health check failed");
            PluginHealthReport::unhealthy(name, Utc::now(), err.to_string())
        }
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.names())
            .finish()
    }
}
