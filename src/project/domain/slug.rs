//! Machine-safe project slug.

use super::ProjectDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

const MIN_SLUG_LENGTH: usize = 3;
const MAX_SLUG_LENGTH: usize = 100;

/// Globally unique, machine-safe project identifier matching
/// `^[a-z0-9-]{3,100}$`.
///
/// Slugs are not normalised: `Alpha` is rejected rather than lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Creates a validated slug.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::InvalidSlug`] when the value is outside
    /// 3 to 100 characters or contains anything but `[a-z0-9-]`.
    pub fn new(value: impl Into<String>) -> Result<Self, ProjectDomainError> {
        let raw = value.into();
        let is_valid = (MIN_SLUG_LENGTH..=MAX_SLUG_LENGTH).contains(&raw.len())
            && raw
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
        if !is_valid {
            return Err(ProjectDomainError::InvalidSlug(raw));
        }
        Ok(Self(raw))
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Slug {
    type Error = ProjectDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Slug> for String {
    fn from(value: Slug) -> Self {
        value.0
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
