//! Capability contract every provider integration implements.

use crate::plugin::domain::{
    Deadline, DeadlineElapsed, PluginName, ProvisionRequest, ProvisionResult, StatusResult,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for plugin operations.
pub type PluginResult<T> = Result<T, PluginError>;

/// Provider integration contract.
///
/// Every operation receives a [`Deadline`] and must finish (successfully or
/// with [`PluginError::DeadlineExceeded`]) by then. Implementations must also
/// tolerate being dropped mid-call: a dropped future is a cancellation.
///
/// `provision` is not idempotent. Callers must not retry it blindly.
#[async_trait]
pub trait ProvisioningPlugin: Send + Sync {
    /// Returns the unique name used as the registry key.
    fn name(&self) -> &PluginName;

    /// Checks that the provider is configured and reachable.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError`] when the provider cannot be reached or the
    /// deadline passes.
    async fn health(&self, deadline: Deadline) -> PluginResult<()>;

    /// Requests creation of external resources.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError`] when the provider rejects the request, its
    /// output cannot be understood, or the deadline passes.
    async fn provision(
        &self,
        deadline: Deadline,
        request: &ProvisionRequest,
    ) -> PluginResult<ProvisionResult>;

    /// Returns the current state of a provisioned resource.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError`] when the provider cannot report status or the
    /// deadline passes.
    async fn status(&self, deadline: Deadline, resource_id: &str) -> PluginResult<StatusResult>;

    /// Requests destruction of a provisioned resource.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError`] when the provider rejects the request or the
    /// deadline passes.
    async fn deprovision(&self, deadline: Deadline, resource_id: &str) -> PluginResult<()>;
}

/// Errors returned by plugin implementations.
#[derive(Debug, Clone, Error)]
pub enum PluginError {
    /// The operation did not finish before its deadline.
    #[error("{operation} did not complete before its deadline")]
    DeadlineExceeded {
        /// Name of the plugin operation.
        operation: &'static str,
    },

    /// The provider is missing or unreachable.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// A provider command exited unsuccessfully.
    #[error("{program} exited with {exit_code:?}: {stderr}")]
    CommandFailed {
        /// Program that was executed.
        program: String,
        /// Exit code, absent when the process was killed by a signal.
        exit_code: Option<i32>,
        /// Captured diagnostic output.
        stderr: String,
    },

    /// The provider produced output that violates the adapter protocol.
    #[error("provider protocol violation: {0}")]
    Protocol(String),

    /// Opaque provider failure.
    #[error("provider error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl PluginError {
    /// Builds a deadline error for the named operation.
    #[must_use]
    pub const fn deadline_exceeded(operation: &'static str) -> Self {
        Self::DeadlineExceeded { operation }
    }

    /// Wraps an opaque provider error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }

    /// Returns a closure mapping [`DeadlineElapsed`] into this error for the
    /// named operation, for use with `map_err`.
    pub fn on_elapsed(operation: &'static str) -> impl Fn(DeadlineElapsed) -> Self {
        move |DeadlineElapsed| Self::deadline_exceeded(operation)
    }
}
