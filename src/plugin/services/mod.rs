//! Plugin registry and health-check services.

mod registry;

pub use registry::{PluginRegistry, RegistryError, RegistryResult};
