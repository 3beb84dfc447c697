//! Adapter implementations for plugin ports.

pub mod memory;
pub mod process;
pub mod proxmox;

pub use memory::{InMemoryPlugin, ProvisionBehaviour};
pub use process::TokioCommandRunner;
pub use proxmox::ProxmoxCliPlugin;
