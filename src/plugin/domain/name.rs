//! Validated plugin name type.

use super::PluginDomainError;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Maximum length for a plugin name.
const MAX_NAME_LENGTH: usize = 64;

/// Stable, unique identifier of a provisioning plugin (e.g. `proxmox`).
///
/// Plugin names are registry keys, so they are compared verbatim: no
/// trimming or case folding is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PluginName(String);

impl PluginName {
    /// Creates a validated plugin name.
    ///
    /// # Errors
    ///
    /// Returns [`PluginDomainError::EmptyPluginName`] when the value is empty,
    /// [`PluginDomainError::PluginNameTooLong`] when it exceeds 64 characters,
    /// or [`PluginDomainError::InvalidPluginName`] when it contains characters
    /// outside `[a-z0-9_-]`.
    pub fn new(value: impl Into<String>) -> Result<Self, PluginDomainError> {
        let raw = value.into();

        if raw.is_empty() {
            return Err(PluginDomainError::EmptyPluginName);
        }

        if raw.len() > MAX_NAME_LENGTH {
            return Err(PluginDomainError::PluginNameTooLong(raw));
        }

        let is_valid = raw
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
        if !is_valid {
            return Err(PluginDomainError::InvalidPluginName(raw));
        }

        Ok(Self(raw))
    }

    /// Returns the plugin name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PluginName {
    type Error = PluginDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PluginName> for String {
    fn from(value: PluginName) -> Self {
        value.0
    }
}

impl AsRef<str> for PluginName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for PluginName {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for PluginName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
