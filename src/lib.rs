//! Quokka: project records with pluggable resource provisioning.
//!
//! Creating a project persists a domain record and then asks a provider
//! plugin (a hypervisor, a container host) to create the matching external
//! resource. Provisioning is best-effort: it runs detached under its own
//! deadline and its failures are logged, never returned to the caller.
//!
//! # Architecture
//!
//! Quokka follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, CLI tools)
//!
//! # Modules
//!
//! - [`plugin`]: Provisioning plugin contract, registry and adapters
//! - [`project`]: Project lifecycle and provisioning orchestration
//! - [`http`]: axum transport for the project API
//! - [`config`]: Environment configuration
//! - [`telemetry`]: Tracing subscriber setup

pub mod config;
pub mod http;
pub mod plugin;
pub mod project;
pub mod telemetry;
