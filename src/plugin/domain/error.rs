//! Error types for plugin domain validation.

use thiserror::Error;

/// Errors returned while constructing plugin domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PluginDomainError {
    /// The plugin name is empty.
    #[error("plugin name must not be empty")]
    EmptyPluginName,

    /// The plugin name contains characters outside `[a-z0-9_-]`.
    #[error(
        "plugin name '{0}' contains invalid characters (only lowercase alphanumeric, hyphens and underscores allowed)"
    )]
    InvalidPluginName(String),

    /// The plugin name exceeds the 64-character limit.
    #[error("plugin name exceeds 64 character limit: {0}")]
    PluginNameTooLong(String),
}
