//! Project CRUD handlers.

use super::{AppState, error::ApiError};
use crate::project::{
    domain::Project,
    ports::ProjectRepository,
    services::{CreateProjectRequest, UpdateProjectRequest},
};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection, rejection::QueryRejection},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `POST /projects`.
///
/// `unix_name` is accepted as an alias for `slug`.
#[derive(Debug, Deserialize)]
pub struct CreateProjectBody {
    name: String,
    #[serde(alias = "unix_name")]
    slug: String,
    #[serde(default)]
    description: Option<String>,
}

/// Body of `PUT /projects/{id}`. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProjectBody {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    active: Option<bool>,
}

/// Paging parameters of `GET /projects`.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    limit: Option<i64>,
    #[serde(default)]
    offset: Option<i64>,
}

/// Project representation returned by every project endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectBody {
    /// Project identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Globally unique slug.
    pub slug: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Active flag.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<&Project> for ProjectBody {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id().into_inner(),
            name: project.name().as_str().to_owned(),
            slug: project.slug().as_str().to_owned(),
            description: project.description().map(|d| d.as_str().to_owned()),
            active: project.is_active(),
            created_at: project.created_at(),
            updated_at: project.updated_at(),
        }
    }
}

pub(super) async fn create_project<R, C>(
    State(state): State<AppState<R, C>>,
    payload: Result<Json<CreateProjectBody>, JsonRejection>,
) -> Result<(StatusCode, Json<ProjectBody>), ApiError>
where
    R: ProjectRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let Json(body) = payload.map_err(|rejection| ApiError::invalid_request(rejection.body_text()))?;
    let mut request = CreateProjectRequest::new(body.name, body.slug);
    if let Some(description) = body.description {
        request = request.with_description(description);
    }
    let project = state.projects.create(request).await?;
    Ok((StatusCode::CREATED, Json(ProjectBody::from(&project))))
}

pub(super) async fn list_projects<R, C>(
    State(state): State<AppState<R, C>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<ProjectBody>>, ApiError>
where
    R: ProjectRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let Query(paging) = query.map_err(|rejection| ApiError::invalid_request(rejection.body_text()))?;
    let projects = state
        .projects
        .list(paging.limit.unwrap_or(0), paging.offset.unwrap_or(0))
        .await?;
    Ok(Json(projects.iter().map(ProjectBody::from).collect()))
}

pub(super) async fn get_project<R, C>(
    State(state): State<AppState<R, C>>,
    Path(id): Path<String>,
) -> Result<Json<ProjectBody>, ApiError>
where
    R: ProjectRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let project = state.projects.get(&id).await?;
    Ok(Json(ProjectBody::from(&project)))
}

pub(super) async fn update_project<R, C>(
    State(state): State<AppState<R, C>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateProjectBody>, JsonRejection>,
) -> Result<Json<ProjectBody>, ApiError>
where
    R: ProjectRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let Json(body) = payload.map_err(|rejection| ApiError::invalid_request(rejection.body_text()))?;
    let mut request = UpdateProjectRequest::new();
    if let Some(name) = body.name {
        request = request.with_name(name);
    }
    if let Some(description) = body.description {
        request = request.with_description(description);
    }
    if let Some(active) = body.active {
        request = request.with_active(active);
    }
    let project = state.projects.update(&id, request).await?;
    Ok(Json(ProjectBody::from(&project)))
}

pub(super) async fn delete_project<R, C>(
    State(state): State<AppState<R, C>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
    R: ProjectRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    state.projects.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
