//! Domain model for projects.
//!
//! A project is the persisted record that provisioning hangs off. Its slug is
//! globally unique; uniqueness itself is enforced by the store.

mod description;
mod error;
mod ids;
mod name;
mod project;
mod slug;

pub use description::ProjectDescription;
pub use error::ProjectDomainError;
pub use ids::ProjectId;
pub use name::ProjectName;
pub use project::{PersistedProjectData, Project, ProjectPatch};
pub use slug::Slug;
