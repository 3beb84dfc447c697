//! Diesel row models for project persistence.

use super::schema::projects;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for project records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProjectRow {
    /// Internal project identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Globally unique slug.
    pub slug: String,
    /// Optional description.
    pub description: Option<String>,
    /// Active flag.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for project records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = projects)]
pub struct NewProjectRow {
    /// Internal project identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Globally unique slug.
    pub slug: String,
    /// Optional description.
    pub description: Option<String>,
    /// Active flag.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Changeset for mutable project columns.
///
/// `description` is written even when `None` so clearing it reaches the row.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = projects)]
#[diesel(treat_none_as_null = true)]
pub struct ProjectChangeset {
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Active flag.
    pub active: bool,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
