//! Project aggregate root.

use super::{ProjectDescription, ProjectId, ProjectName, Slug};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Project aggregate root.
///
/// A project is active on creation. Nothing about provisioned resources is
/// recorded here; their state is fetched from the provider on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    name: ProjectName,
    slug: Slug,
    description: Option<ProjectDescription>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedProjectData {
    /// Persisted project identifier.
    pub id: ProjectId,
    /// Persisted display name.
    pub name: ProjectName,
    /// Persisted slug.
    pub slug: Slug,
    /// Persisted description.
    pub description: Option<ProjectDescription>,
    /// Persisted active flag.
    pub active: bool,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Partial update applied to an existing project.
///
/// Unset fields are left unchanged. A blank description clears the stored
/// one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    name: Option<ProjectName>,
    description: Option<String>,
    active: Option<bool>,
}

impl ProjectPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the display name.
    #[must_use]
    pub fn with_name(mut self, name: ProjectName) -> Self {
        self.name = Some(name);
        self
    }

    /// Replaces the description; a blank value clears it.
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

    /// Returns `true` when the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.active.is_none()
    }
}

impl Project {
    /// Creates a new active project with a fresh identifier.
    #[must_use]
    pub fn new(
        name: ProjectName,
        slug: Slug,
        description: Option<ProjectDescription>,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: ProjectId::new(),
            name,
            slug,
            description,
            active: true,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a project from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedProjectData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            slug: data.slug,
            description: data.description,
            active: data.active,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn id(&self) -> ProjectId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub const fn name(&self) -> &ProjectName {
        &self.name
    }

    /// Returns the slug.
    #[must_use]
    pub const fn slug(&self) -> &Slug {
        &self.slug
    }

    /// Returns the description, if any.
    #[must_use]
    pub const fn description(&self) -> Option<&ProjectDescription> {
        self.description.as_ref()
    }

    /// Returns whether the project is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Applies `patch` and bumps `updated_at`.
    ///
    /// The slug is immutable and never part of a patch.
    pub fn apply(&mut self, patch: ProjectPatch, clock: &impl Clock) {
        let ProjectPatch {
            name,
            description,
            active,
        } = patch;
        if let Some(new_name) = name {
            self.name = new_name;
        }
        if let Some(raw_description) = description {
            self.description = ProjectDescription::new(raw_description);
        }
        if let Some(flag) = active {
            self.active = flag;
        }
        self.touch(clock);
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
