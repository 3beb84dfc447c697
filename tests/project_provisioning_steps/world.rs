//! Shared world state for project provisioning BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use quokka::{
    plugin::{adapters::InMemoryPlugin, services::PluginRegistry},
    project::{
        adapters::memory::InMemoryProjectRepository,
        domain::Project,
        services::{ProjectService, ProjectServiceError},
    },
};
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestProjectService = ProjectService<InMemoryProjectRepository, DefaultClock>;

/// Scenario world for project provisioning behaviour tests.
pub struct ProjectWorld {
    /// The project service under test.
    pub service: TestProjectService,
    /// Store shared with the service, inspected directly by assertions.
    pub repository: Arc<InMemoryProjectRepository>,
    /// Registry shared with the service.
    pub registry: Arc<PluginRegistry>,
    /// Plugin registered by a given step, if any.
    pub plugin: Option<InMemoryPlugin>,
    /// Result of the last create call.
    pub last_create_result: Option<Result<Project, ProjectServiceError>>,
}

impl ProjectWorld {
    /// Creates a world with an empty store and registry.
    #[must_use]
    pub fn new() -> Self {
        let repository = Arc::new(InMemoryProjectRepository::new());
        let registry = Arc::new(PluginRegistry::new());
        let service = ProjectService::new(
            Arc::clone(&repository),
            Arc::clone(&registry),
            Arc::new(DefaultClock),
        );
        Self {
            service,
            repository,
            registry,
            plugin: None,
            last_create_result: None,
        }
    }
}

impl Default for ProjectWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> ProjectWorld {
    ProjectWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
