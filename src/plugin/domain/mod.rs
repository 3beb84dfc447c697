//! Domain model for provisioning plugins.
//!
//! Plugins are stateless from the orchestrator's point of view: every piece
//! of request data travels in the call, and every call is bounded by a
//! [`Deadline`].

mod deadline;
mod error;
mod health;
mod name;
mod provision;

pub use deadline::{Deadline, DeadlineElapsed, FAR_FUTURE};
pub use error::PluginDomainError;
pub use health::PluginHealthReport;
pub use name::PluginName;
pub use provision::{ProvisionRequest, ProvisionResult, StatusResult};
