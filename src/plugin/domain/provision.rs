//! Request and result payloads exchanged with provisioning plugins.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Parameters for creating external resources on behalf of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionRequest {
    project_id: String,
    project_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    template: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    resources: BTreeMap<String, Value>,
}

impl ProvisionRequest {
    /// Creates a request for the given project.
    #[must_use]
    pub fn new(project_id: impl Into<String>, project_name: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            project_name: project_name.into(),
            template: None,
            resources: BTreeMap::new(),
        }
    }

    /// Sets the provider template identifier.
    #[must_use]
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Adds an opaque resource hint.
    #[must_use]
    pub fn with_resource(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.resources.insert(key.into(), value.into());
        self
    }

    /// Returns the project identifier.
    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Returns the project display name.
    #[must_use]
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Returns the template identifier, if any.
    #[must_use]
    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    /// Returns the resource hints.
    #[must_use]
    pub const fn resources(&self) -> &BTreeMap<String, Value> {
        &self.resources
    }
}

/// Outcome of a successful provisioning attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionResult {
    resource_id: String,
    status: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    metadata: BTreeMap<String, String>,
}

impl ProvisionResult {
    /// Creates a result with a provider-assigned resource identifier.
    #[must_use]
    pub fn new(resource_id: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            status: status.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Adds a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Returns the provider-assigned resource identifier.
    #[must_use]
    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    /// Returns the provider status string.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Returns provider metadata.
    #[must_use]
    pub const fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }
}

/// Current state of a provisioned resource, fetched on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResult {
    status: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    metadata: BTreeMap<String, String>,
}

impl StatusResult {
    /// Creates a status result.
    #[must_use]
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Adds a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Returns the provider status string.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Returns provider metadata.
    #[must_use]
    pub const fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }
}
