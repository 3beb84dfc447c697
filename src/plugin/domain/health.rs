//! Health report produced by bulk plugin health checks.

use super::PluginName;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Result of probing one registered plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginHealthReport {
    plugin: PluginName,
    healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    checked_at: DateTime<Utc>,
}

impl PluginHealthReport {
    /// Creates a report for a plugin that answered its health check.
    #[must_use]
    pub const fn healthy(plugin: PluginName, checked_at: DateTime<Utc>) -> Self {
        Self {
            plugin,
            healthy: true,
            message: None,
            checked_at,
        }
    }

    /// Creates a report for a plugin whose health check failed.
    #[must_use]
    pub fn unhealthy(
        plugin: PluginName,
        checked_at: DateTime<Utc>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            plugin,
            healthy: false,
            message: Some(message.into()),
            checked_at,
        }
    }

    /// Returns the checked plugin name.
    #[must_use]
    pub const fn plugin(&self) -> &PluginName {
        &self.plugin
    }

    /// Returns whether the check succeeded.
    #[must_use]
    pub const fn is_healthy(&self) -> bool {
        self.healthy
    }

    /// Returns the failure message for unhealthy plugins.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns when the check completed.
    #[must_use]
    pub const fn checked_at(&self) -> DateTime<Utc> {
        self.checked_at
    }
}
