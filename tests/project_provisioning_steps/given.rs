//! Given steps for project provisioning BDD scenarios.

use std::sync::Arc;

use super::world::ProjectWorld;
use eyre::WrapErr;
use quokka::plugin::{
    adapters::{InMemoryPlugin, ProvisionBehaviour},
    domain::{PluginName, ProvisionResult},
};
use rstest_bdd_macros::given;

fn register(world: &mut ProjectWorld, plugin: InMemoryPlugin) -> Result<(), eyre::Report> {
    world
        .registry
        .register(Arc::new(plugin.clone()))
        .wrap_err("register scenario plugin")?;
    world.plugin = Some(plugin);
    Ok(())
}

#[given(r#"a provisioning plugin "{name}" that returns resource "{resource}" with status "{status}""#)]
fn plugin_that_succeeds(
    world: &mut ProjectWorld,
    name: String,
    resource: String,
    status: String,
) -> Result<(), eyre::Report> {
    let plugin_name = PluginName::new(name).wrap_err("scenario plugin name")?;
    let plugin = InMemoryPlugin::with_behaviour(
        plugin_name,
        ProvisionBehaviour::Succeed(ProvisionResult::new(resource, status)),
    );
    register(world, plugin)
}

#[given(r#"a provisioning plugin "{name}" that fails with "{message}""#)]
fn plugin_that_fails(
    world: &mut ProjectWorld,
    name: String,
    message: String,
) -> Result<(), eyre::Report> {
    let plugin_name = PluginName::new(name).wrap_err("scenario plugin name")?;
    let plugin = InMemoryPlugin::with_behaviour(plugin_name, ProvisionBehaviour::Fail(message));
    register(world, plugin)
}

#[given("no provisioning plugin is registered")]
fn no_plugin(world: &mut ProjectWorld) -> Result<(), eyre::Report> {
    if !world.registry.is_empty() {
        return Err(eyre::eyre!("expected an empty plugin registry"));
    }
    Ok(())
}
