//! Application services for project lifecycle and provisioning.

mod lifecycle;

pub use lifecycle::{
    CreateProjectRequest, DEFAULT_PAGE_SIZE, ProjectService, ProjectServiceError,
    ProjectServiceResult, ProvisioningPolicy, UpdateProjectRequest,
};
