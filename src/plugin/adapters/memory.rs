//! In-memory provisioning plugin for tests and local runs.

use crate::plugin::{
    domain::{Deadline, PluginName, ProvisionRequest, ProvisionResult, StatusResult},
    ports::{PluginError, PluginResult, ProvisioningPlugin},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// Scripted outcome for [`InMemoryPlugin::provision`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionBehaviour {
    /// Returns the given result.
    Succeed(ProvisionResult),
    /// Fails with [`PluginError::Unavailable`] carrying the message.
    Fail(String),
    /// Waits for the given duration, then returns the result. The wait is
    /// cut short by the call deadline.
    Delay(Duration, ProvisionResult),
}

/// Plugin that keeps provisioned resources in memory.
///
/// It records every request it receives so tests can assert on provisioning
/// attempts, and it honours call deadlines.
#[derive(Debug, Clone)]
pub struct InMemoryPlugin {
    name: PluginName,
    state: Arc<RwLock<InMemoryPluginState>>,
}

#[derive(Debug)]
struct InMemoryPluginState {
    behaviour: ProvisionBehaviour,
    healthy: bool,
    requests: Vec<ProvisionRequest>,
    resources: HashMap<String, StatusResult>,
    completed: usize,
}

impl InMemoryPlugin {
    /// Creates a healthy plugin that provisions resource `r-1`.
    #[must_use]
    pub fn new(name: PluginName) -> Self {
        Self::with_behaviour(
            name,
            ProvisionBehaviour::Succeed(ProvisionResult::new("r-1", "provisioned")),
        )
    }

    /// Creates a plugin with a scripted provisioning outcome.
    #[must_use]
    pub fn with_behaviour(name: PluginName, behaviour: ProvisionBehaviour) -> Self {
        Self {
            name,
            state: Arc::new(RwLock::new(InMemoryPluginState {
                behaviour,
                healthy: true,
                requests: Vec::new(),
                resources: HashMap::new(),
                completed: 0,
            })),
        }
    }

    /// Replaces the scripted provisioning outcome.
    pub fn set_behaviour(&self, behaviour: ProvisionBehaviour) {
        self.write().behaviour = behaviour;
    }

    /// Marks the plugin healthy or unhealthy for subsequent health checks.
    pub fn set_healthy(&self, healthy: bool) {
        self.write().healthy = healthy;
    }

    /// Returns every provisioning request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<ProvisionRequest> {
        self.read().requests.clone()
    }

    /// Returns the number of provisioning calls that returned successfully.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.read().completed
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, InMemoryPluginState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, InMemoryPluginState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn record_success(&self, result: ProvisionResult) -> ProvisionResult {
        let mut state = self.write();
        state.completed += 1;
        state.resources.insert(
            result.resource_id().to_owned(),
            StatusResult::new(result.status()),
        );
        result
    }
}

#[async_trait]
impl ProvisioningPlugin for InMemoryPlugin {
    fn name(&self) -> &PluginName {
        &self.name
    }

    async fn health(&self, deadline: Deadline) -> PluginResult<()> {
        if deadline.has_elapsed() {
            return Err(PluginError::deadline_exceeded("health"));
        }
        if self.read().healthy {
            Ok(())
        } else {
            Err(PluginError::Unavailable(format!(
                "{} is marked unhealthy",
                self.name
            )))
        }
    }

    async fn provision(
        &self,
        deadline: Deadline,
        request: &ProvisionRequest,
    ) -> PluginResult<ProvisionResult> {
        let behaviour = {
            let mut state = self.write();
            state.requests.push(request.clone());
            state.behaviour.clone()
        };

        match behaviour {
            ProvisionBehaviour::Succeed(result) => Ok(self.record_success(result)),
            ProvisionBehaviour::Fail(message) => Err(PluginError::Unavailable(message)),
            ProvisionBehaviour::Delay(wait, result) => {
                deadline
                    .run(tokio::time::sleep(wait))
                    .await
                    .map_err(PluginError::on_elapsed("provision"))?;
                Ok(self.record_success(result))
            }
        }
    }

    async fn status(&self, deadline: Deadline, resource_id: &str) -> PluginResult<StatusResult> {
        if deadline.has_elapsed() {
            return Err(PluginError::deadline_exceeded("status"));
        }
        self.read()
            .resources
            .get(resource_id)
            .cloned()
            .ok_or_else(|| PluginError::Protocol(format!("unknown resource {resource_id}")))
    }

    async fn deprovision(&self, deadline: Deadline, resource_id: &str) -> PluginResult<()> {
        if deadline.has_elapsed() {
            return Err(PluginError::deadline_exceeded("deprovision"));
        }
        self.write()
            .resources
            .remove(resource_id)
            .map(|_| ())
            .ok_or_else(|| PluginError::Protocol(format!("unknown resource {resource_id}")))
    }
}
