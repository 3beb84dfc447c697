//! HTTP transport for the project API.
//!
//! Handlers translate JSON to service calls and service errors to status
//! codes. No business rule lives here.

mod error;
mod health;
mod projects;

pub use error::ApiError;
pub use health::HealthBody;
pub use projects::{CreateProjectBody, ListQuery, ProjectBody, UpdateProjectBody};

use crate::project::{ports::ProjectRepository, services::ProjectService};
use axum::{Router, routing::get};
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

/// Default budget for each plugin health check behind `GET /health`.
pub const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared handler state.
pub struct AppState<R, C>
where
    R: ProjectRepository,
    C: Clock + Send + Sync,
{
    projects: Arc<ProjectService<R, C>>,
    health_timeout: Duration,
}

impl<R, C> AppState<R, C>
where
    R: ProjectRepository,
    C: Clock + Send + Sync,
{
    /// Creates handler state around a shared project service.
    #[must_use]
    pub const fn new(projects: Arc<ProjectService<R, C>>) -> Self {
        Self {
            projects,
            health_timeout: DEFAULT_HEALTH_TIMEOUT,
        }
    }

    /// Overrides the per-plugin health check budget.
    #[must_use]
    pub const fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }
}

impl<R, C> Clone for AppState<R, C>
where
    R: ProjectRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            projects: Arc::clone(&self.projects),
            health_timeout: self.health_timeout,
        }
    }
}

/// Builds the `/api/v1` router.
#[must_use]
pub fn router<R, C>(state: AppState<R, C>) -> Router
where
    R: ProjectRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let api = Router::new()
        .route(
            "/projects",
            get(projects::list_projects::<R, C>).post(projects::create_project::<R, C>),
        )
        .route(
            "/projects/{id}",
            get(projects::get_project::<R, C>)
                .put(projects::update_project::<R, C>)
                .delete(projects::delete_project::<R, C>),
        )
        .route("/health", get(health::health::<R, C>))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests;
