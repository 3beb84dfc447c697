//! Shared test helpers for in-memory integration tests.

use std::sync::Arc;

use mockable::DefaultClock;
use quokka::{
    plugin::{
        adapters::{InMemoryPlugin, ProvisionBehaviour},
        domain::PluginName,
        services::PluginRegistry,
    },
    project::{
        adapters::memory::InMemoryProjectRepository,
        services::{ProjectService, ProvisioningPolicy},
    },
};
use rstest::fixture;

/// Service type wired to in-memory adapters.
pub type TestProjectService = ProjectService<InMemoryProjectRepository, DefaultClock>;

/// Project service with its collaborators exposed for assertions.
pub struct Wiring {
    /// Service under test.
    pub service: TestProjectService,
    /// Store shared with the service.
    pub repository: Arc<InMemoryProjectRepository>,
    /// Registry shared with the service.
    pub registry: Arc<PluginRegistry>,
}

impl Wiring {
    /// Replaces the provisioning policy of the wired service.
    #[must_use]
    pub fn with_policy(self, policy: ProvisioningPolicy) -> Self {
        Self {
            service: self.service.with_provisioning_policy(policy),
            ..self
        }
    }

    /// Registers an in-memory plugin and returns a handle to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or already registered.
    pub fn register_plugin(
        &self,
        name: &str,
        behaviour: ProvisionBehaviour,
    ) -> Result<InMemoryPlugin, Box<dyn std::error::Error + Send + Sync>> {
        let plugin_name = PluginName::new(name)?;
        let plugin = InMemoryPlugin::with_behaviour(plugin_name, behaviour);
        self.registry.register(Arc::new(plugin.clone()))?;
        Ok(plugin)
    }
}

/// Provides a service over a fresh store and an empty registry.
#[fixture]
pub fn wiring() -> Wiring {
    let repository = Arc::new(InMemoryProjectRepository::new());
    let registry = Arc::new(PluginRegistry::new());
    let service = ProjectService::new(
        Arc::clone(&repository),
        Arc::clone(&registry),
        Arc::new(DefaultClock),
    );
    Wiring {
        service,
        repository,
        registry,
    }
}
