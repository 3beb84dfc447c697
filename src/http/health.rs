//! Bulk plugin health endpoint.

use super::AppState;
use crate::plugin::domain::PluginHealthReport;
use crate::project::ports::ProjectRepository;
use axum::{Json, extract::State, http::StatusCode};
use mockable::Clock;
use serde::Serialize;

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthBody {
    status: &'static str,
    plugins: Vec<PluginHealthReport>,
}

pub(super) async fn health<R, C>(
    State(state): State<AppState<R, C>>,
) -> (StatusCode, Json<HealthBody>)
where
    R: ProjectRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let plugins = state
        .projects
        .registry()
        .check_health(state.health_timeout)
        .await;
    if plugins.iter().all(PluginHealthReport::is_healthy) {
        (
            StatusCode::OK,
            Json(HealthBody {
                status: "ok",
                plugins,
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthBody {
                status: "degraded",
                plugins,
            }),
        )
    }
}
