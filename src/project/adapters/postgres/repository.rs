//! `PostgreSQL` repository implementation for projects.

use super::{
    models::{NewProjectRow, ProjectChangeset, ProjectRow},
    schema::projects,
};
use crate::project::{
    domain::{
        PersistedProjectData, Project, ProjectDescription, ProjectId, ProjectName, Slug,
    },
    ports::{ProjectRepository, ProjectRepositoryError, ProjectRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by project adapters.
pub type ProjectPgPool = Pool<ConnectionManager<PgConnection>>;

/// Name of the unique constraint on `projects.slug`.
const SLUG_UNIQUE_CONSTRAINT: &str = "projects_slug_key";

/// `PostgreSQL`-backed project repository.
#[derive(Debug, Clone)]
pub struct PostgresProjectRepository {
    pool: ProjectPgPool,
}

impl PostgresProjectRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: ProjectPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> ProjectRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ProjectRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ProjectRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(ProjectRepositoryError::persistence)?
    }
}

#[async_trait]
impl ProjectRepository for PostgresProjectRepository {
    async fn create(&self, project: &Project) -> ProjectRepositoryResult<()> {
        let project_id = project.id();
        let slug = project.slug().clone();
        let new_row = to_new_row(project);

        self.run_blocking(move |connection| {
            diesel::insert_into(projects::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| map_insert_error(err, &slug, project_id))?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: ProjectId) -> ProjectRepositoryResult<Option<Project>> {
        self.run_blocking(move |connection| {
            let row = projects::table
                .filter(projects::id.eq(id.into_inner()))
                .select(ProjectRow::as_select())
                .first::<ProjectRow>(connection)
                .optional()
                .map_err(ProjectRepositoryError::persistence)?;
            row.map(row_to_project).transpose()
        })
        .await
    }

    async fn list(&self, limit: u32, offset: u32) -> ProjectRepositoryResult<Vec<Project>> {
        self.run_blocking(move |connection| {
            let rows = projects::table
                .order((projects::created_at.asc(), projects::id.asc()))
                .limit(i64::from(limit))
                .offset(i64::from(offset))
                .select(ProjectRow::as_select())
                .load::<ProjectRow>(connection)
                .map_err(ProjectRepositoryError::persistence)?;
            rows.into_iter().map(row_to_project).collect()
        })
        .await
    }

    async fn update(&self, project: &Project) -> ProjectRepositoryResult<()> {
        let project_id = project.id();
        let changeset = ProjectChangeset {
            name: project.name().as_str().to_owned(),
            description: project.description().map(|d| d.as_str().to_owned()),
            active: project.is_active(),
            updated_at: project.updated_at(),
        };

        self.run_blocking(move |connection| {
            let updated_count =
                diesel::update(projects::table.filter(projects::id.eq(project_id.into_inner())))
                    .set(&changeset)
                    .execute(connection)
                    .map_err(ProjectRepositoryError::persistence)?;
            require_affected(updated_count, project_id)
        })
        .await
    }

    async fn delete(&self, id: ProjectId) -> ProjectRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let deleted_count =
                diesel::delete(projects::table.filter(projects::id.eq(id.into_inner())))
                    .execute(connection)
                    .map_err(ProjectRepositoryError::persistence)?;
            require_affected(deleted_count, id)
        })
        .await
    }
}

fn to_new_row(project: &Project) -> NewProjectRow {
    NewProjectRow {
        id: project.id().into_inner(),
        name: project.name().as_str().to_owned(),
        slug: project.slug().as_str().to_owned(),
        description: project.description().map(|d| d.as_str().to_owned()),
        active: project.is_active(),
        created_at: project.created_at(),
        updated_at: project.updated_at(),
    }
}

fn row_to_project(row: ProjectRow) -> ProjectRepositoryResult<Project> {
    let ProjectRow {
        id,
        name,
        slug,
        description,
        active,
        created_at,
        updated_at,
    } = row;

    let data = PersistedProjectData {
        id: ProjectId::from_uuid(id),
        name: ProjectName::new(name).map_err(ProjectRepositoryError::invalid_persisted_data)?,
        slug: Slug::new(slug).map_err(ProjectRepositoryError::invalid_persisted_data)?,
        description: description.and_then(ProjectDescription::new),
        active,
        created_at,
        updated_at,
    };
    Ok(Project::from_persisted(data))
}

/// Maps an insert failure to the store's duplicate signals.
///
/// Only a unique violation on [`SLUG_UNIQUE_CONSTRAINT`] means the slug is
/// taken; any other unique violation is a primary-key collision.
fn map_insert_error(err: DieselError, slug: &Slug, project_id: ProjectId) -> ProjectRepositoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
            if is_slug_unique_violation(info.as_ref()) =>
        {
            ProjectRepositoryError::DuplicateSlug(slug.clone())
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            ProjectRepositoryError::DuplicateProject(project_id)
        }
        other => ProjectRepositoryError::persistence(other),
    }
}

/// Treats an update or delete that touched no rows as a missing project.
const fn require_affected(affected: usize, id: ProjectId) -> ProjectRepositoryResult<()> {
    if affected == 0 {
        Err(ProjectRepositoryError::NotFound(id))
    } else {
        Ok(())
    }
}

fn is_slug_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == SLUG_UNIQUE_CONSTRAINT)
}
