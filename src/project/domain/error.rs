//! Error types for project domain validation.

use thiserror::Error;

/// Errors returned while constructing project domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProjectDomainError {
    /// The project name is shorter than 3 or longer than 255 characters.
    #[error("project name must be between 3 and 255 characters, got {0}")]
    InvalidName(usize),

    /// The slug violates the length or character rules.
    #[error(
        "invalid slug '{0}': must be 3-100 characters of lowercase letters, digits and hyphens"
    )]
    InvalidSlug(String),

    /// The identifier is not a well-formed UUID.
    #[error("invalid project id: {0}")]
    InvalidProjectId(String),
}
