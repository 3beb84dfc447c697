//! Step definitions for project provisioning scenarios.

mod given;
mod then;
mod when;
pub mod world;
