//! Project records and provisioning orchestration for Quokka.
//!
//! Projects are persisted through the [`ports::ProjectRepository`] contract
//! and then handed to a provisioning plugin on a best-effort basis. The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
