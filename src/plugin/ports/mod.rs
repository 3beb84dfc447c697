//! Port contracts for provisioning plugins.
//!
//! [`ProvisioningPlugin`] is the extension point provider adapters implement.
//! [`CommandRunner`] isolates subprocess execution for adapters that wrap a
//! command-line tool.

pub mod command;
pub mod plugin;

pub use command::{CommandOutput, CommandRunner};
pub use plugin::{PluginError, PluginResult, ProvisioningPlugin};
