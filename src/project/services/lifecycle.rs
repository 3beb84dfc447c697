//! Service layer for project lifecycle and best-effort provisioning.
//!
//! [`ProjectService`] is the only component that sequences persistence and
//! provisioning. A project is always persisted first; provisioning then runs
//! as a detached task bounded by its own deadline, and its outcome only
//! reaches the log. A failed provisioning attempt never rolls back the
//! persisted project, and a create cancelled during the store call is
//! logged because the write may still land.

use crate::plugin::{
    adapters::proxmox::PROXMOX_PLUGIN_NAME,
    domain::{Deadline, ProvisionRequest},
    ports::PluginError,
    services::PluginRegistry,
};
use crate::project::{
    domain::{
        Project, ProjectDescription, ProjectDomainError, ProjectId, ProjectName, ProjectPatch,
        Slug,
    },
    ports::{ProjectRepository, ProjectRepositoryError},
};
use mockable::Clock;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tracing::Instrument;

/// Page size used when a caller asks for a non-positive limit.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

const DEFAULT_PROVISIONING_TIMEOUT: Duration = Duration::from_secs(30);

/// Request payload for creating a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProjectRequest {
    name: String,
    slug: String,
    description: Option<String>,
}

impl CreateProjectRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
            description: None,
        }
    }

    /// Sets the project description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Request payload for a partial project update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateProjectRequest {
    name: Option<String>,
    description: Option<String>,
    active: Option<bool>,
}

impl UpdateProjectRequest {
    /// Creates an update that changes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replaces the description. An empty value clears it.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the active flag.
    #[must_use]
    pub const fn with_active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    fn into_patch(self) -> Result<ProjectPatch, ProjectDomainError> {
        let Self {
            name,
            description,
            active,
        } = self;
        let mut patch = ProjectPatch::new();
        if let Some(raw_name) = name {
            patch = patch.with_name(ProjectName::new(raw_name)?);
        }
        if let Some(raw_description) = description {
            patch = patch.with_description(raw_description);
        }
        if let Some(flag) = active {
            patch = patch.with_active(flag);
        }
        Ok(patch)
    }
}

/// Which plugin provisions new projects, and for how long it may run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningPolicy {
    plugin: String,
    timeout: Duration,
}

impl ProvisioningPolicy {
    /// Creates a policy targeting `plugin` with a per-attempt `timeout`.
    #[must_use]
    pub fn new(plugin: impl Into<String>, timeout: Duration) -> Self {
        Self {
            plugin: plugin.into(),
            timeout,
        }
    }

    /// Returns the registry name of the provisioning plugin.
    #[must_use]
    pub fn plugin(&self) -> &str {
        &self.plugin
    }

    /// Returns the deadline budget for one provisioning attempt.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for ProvisioningPolicy {
    fn default() -> Self {
        Self::new(PROXMOX_PLUGIN_NAME, DEFAULT_PROVISIONING_TIMEOUT)
    }
}

/// Service-level errors for project operations.
///
/// Provisioning failures have no variant; they never reach callers.
#[derive(Debug, Error)]
pub enum ProjectServiceError {
    /// Name or slug validation failed.
    #[error(transparent)]
    Domain(ProjectDomainError),

    /// The identifier supplied by the caller is malformed.
    #[error("invalid project id: {0}")]
    InvalidProjectId(String),

    /// Another project already uses the slug.
    #[error("project with slug '{0}' already exists")]
    AlreadyExists(Slug),

    /// No project has the identifier.
    #[error("project not found: {0}")]
    NotFound(ProjectId),

    /// Opaque repository failure.
    #[error(transparent)]
    Repository(ProjectRepositoryError),
}

impl From<ProjectDomainError> for ProjectServiceError {
    fn from(err: ProjectDomainError) -> Self {
        match err {
            ProjectDomainError::InvalidProjectId(raw) => Self::InvalidProjectId(raw),
            other => Self::Domain(other),
        }
    }
}

impl From<ProjectRepositoryError> for ProjectServiceError {
    fn from(err: ProjectRepositoryError) -> Self {
        match err {
            ProjectRepositoryError::DuplicateSlug(slug) => Self::AlreadyExists(slug),
            ProjectRepositoryError::NotFound(id) => Self::NotFound(id),
            other => Self::Repository(other),
        }
    }
}

/// Result type for project service operations.
pub type ProjectServiceResult<T> = Result<T, ProjectServiceError>;

/// Project lifecycle orchestration service.
#[derive(Clone)]
pub struct ProjectService<R, C>
where
    R: ProjectRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    registry: Arc<PluginRegistry>,
    clock: Arc<C>,
    policy: ProvisioningPolicy,
    provisioning: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl<R, C> ProjectService<R, C>
where
    R: ProjectRepository,
    C: Clock + Send + Sync,
{
    /// Creates a service using the default provisioning policy.
    #[must_use]
    pub fn new(repository: Arc<R>, registry: Arc<PluginRegistry>, clock: Arc<C>) -> Self {
        Self {
            repository,
            registry,
            clock,
            policy: ProvisioningPolicy::default(),
            provisioning: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Replaces the provisioning policy.
    #[must_use]
    pub fn with_provisioning_policy(mut self, policy: ProvisioningPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the plugin registry the service provisions through.
    #[must_use]
    pub const fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    /// Returns the active provisioning policy.
    #[must_use]
    pub const fn provisioning_policy(&self) -> &ProvisioningPolicy {
        &self.policy
    }

    /// Validates and persists a new project, then starts provisioning.
    ///
    /// Validation happens before the repository is touched. The returned
    /// project reflects successful persistence whatever happens to
    /// provisioning afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::Domain`] for an invalid name or slug,
    /// [`ProjectServiceError::AlreadyExists`] when the slug is taken, or
    /// [`ProjectServiceError::Repository`] when persistence fails.
    pub async fn create(&self, request: CreateProjectRequest) -> ProjectServiceResult<Project> {
        let CreateProjectRequest {
            name,
            slug,
            description,
        } = request;

        let project_name = ProjectName::new(name)?;
        let project_slug = Slug::new(slug)?;
        let project = Project::new(
            project_name,
            project_slug,
            description.and_then(ProjectDescription::new),
            &*self.clock,
        );

        let mut pending = PendingInsert::new(project.id());
        let stored = self.repository.create(&project).await;
        pending.settle();
        stored?;
        tracing::info!(project_id = %project.id(), slug = %project.slug(), "project created");

        self.spawn_provisioning(&project);
        Ok(project)
    }

    /// Retrieves a project by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::InvalidProjectId`] for a malformed
    /// identifier, [`ProjectServiceError::NotFound`] when no project matches,
    /// or [`ProjectServiceError::Repository`] when the lookup fails.
    pub async fn get(&self, raw_id: &str) -> ProjectServiceResult<Project> {
        let id = ProjectId::parse(raw_id)?;
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(ProjectServiceError::NotFound(id))
    }

    /// Returns one page of projects ordered by creation time.
    ///
    /// A non-positive `limit` selects [`DEFAULT_PAGE_SIZE`] and a negative
    /// `offset` is treated as zero.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::Repository`] when the lookup fails.
    pub async fn list(&self, limit: i64, offset: i64) -> ProjectServiceResult<Vec<Project>> {
        let page_size = if limit <= 0 {
            DEFAULT_PAGE_SIZE
        } else {
            u32::try_from(limit).unwrap_or(u32::MAX)
        };
        let skip = u32::try_from(offset.max(0)).unwrap_or(u32::MAX);
        Ok(self.repository.list(page_size, skip).await?)
    }

    /// Applies a partial update to an existing project.
    ///
    /// An update that changes nothing returns the stored project unwritten.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::InvalidProjectId`] for a malformed
    /// identifier, [`ProjectServiceError::Domain`] for an invalid new name,
    /// [`ProjectServiceError::NotFound`] when no project matches, or
    /// [`ProjectServiceError::Repository`] when persistence fails.
    pub async fn update(
        &self,
        raw_id: &str,
        request: UpdateProjectRequest,
    ) -> ProjectServiceResult<Project> {
        let id = ProjectId::parse(raw_id)?;
        let patch = request.into_patch()?;

        let mut project = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(ProjectServiceError::NotFound(id))?;
        if patch.is_empty() {
            return Ok(project);
        }
        project.apply(patch, &*self.clock);
        self.repository.update(&project).await?;
        Ok(project)
    }

    /// Deletes a project.
    ///
    /// Resources provisioned for the project are left in place.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::InvalidProjectId`] for a malformed
    /// identifier, [`ProjectServiceError::NotFound`] when no project matches,
    /// or [`ProjectServiceError::Repository`] when persistence fails.
    pub async fn delete(&self, raw_id: &str) -> ProjectServiceResult<()> {
        let id = ProjectId::parse(raw_id)?;
        self.repository.delete(id).await?;
        tracing::info!(project_id = %id, "project deleted");
        Ok(())
    }

    /// Waits for every provisioning task started so far.
    ///
    /// Each task is bounded by the policy timeout, so this returns within
    /// roughly one timeout of the last task being spawned. Dropping the
    /// returned future, or every clone of the service, leaves the tasks
    /// running to their own deadlines.
    pub async fn drain_provisioning(&self) {
        loop {
            let tasks = std::mem::take(&mut *self.lock_provisioning());
            if tasks.is_empty() {
                break;
            }
            for task in tasks {
                log_join_failure(task.await);
            }
        }
    }

    fn spawn_provisioning(&self, project: &Project) {
        let project_id = project.id();
        let Ok(plugin) = self.registry.get(self.policy.plugin()) else {
            tracing::debug!(
                project_id = %project_id,
                plugin = self.policy.plugin(),
                "no provisioning plugin registered, skipping"
            );
            return;
        };

        let request = ProvisionRequest::new(project_id.to_string(), project.name().as_str());
        let timeout = self.policy.timeout();
        let span = tracing::info_span!("provision", project_id = %project_id, plugin = %plugin.name());
        let task = async move {
            // The deadline starts here, not at the caller, and ignores the
            // caller's own cancellation.
            let deadline = Deadline::after(timeout);
            let outcome = deadline
                .run(plugin.provision(deadline, &request))
                .await
                .map_err(PluginError::on_elapsed("provision"))
                .and_then(std::convert::identity);
            match outcome {
                Ok(result) => tracing::info!(
                    project_id = %project_id,
                    resource_id = result.resource_id(),
                    status = result.status(),
                    "project resources provisioned"
                ),
                Err(err) => tracing::warn!(
                    project_id = %project_id,
                    error = %err,
                    "project provisioning failed"
                ),
            }
        };

        // Dropping a handle detaches its task, so attempts outlive the
        // service. The watcher reports a panicking attempt.
        let attempt = tokio::spawn(task.instrument(span));
        let watcher = tokio::spawn(async move { log_join_failure(attempt.await) });

        let mut tasks = self.lock_provisioning();
        tasks.retain(|tracked| !tracked.is_finished());
        tasks.push(watcher);
    }

    fn lock_provisioning(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.provisioning
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Reports a create abandoned while the store call was in flight.
///
/// Store adapters may finish the write after the caller goes away, leaving a
/// persisted project that never gets a provisioning attempt.
struct PendingInsert {
    project_id: ProjectId,
    settled: bool,
}

impl PendingInsert {
    const fn new(project_id: ProjectId) -> Self {
        Self {
            project_id,
            settled: false,
        }
    }

    const fn settle(&mut self) {
        self.settled = true;
    }
}

impl Drop for PendingInsert {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!(
                project_id = %self.project_id,
                "project create cancelled while persisting; the project may exist without provisioning"
            );
        }
    }
}

fn log_join_failure(joined: Result<(), JoinError>) {
    if let Err(err) = joined {
        tracing::error!(error = %err, "provisioning task aborted");
    }
}
