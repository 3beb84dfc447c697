//! Provisioning plugin contract and registry for Quokka.
//!
//! Provider integrations (hypervisors, container hosts, cloud APIs) plug into
//! project creation through the [`ports::ProvisioningPlugin`] contract. A
//! [`services::PluginRegistry`] built once at process start maps provider
//! names to implementations. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Registry and health-check services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
