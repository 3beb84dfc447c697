//! Then steps for project provisioning BDD scenarios.

use super::world::{ProjectWorld, run_async};
use quokka::project::{
    domain::ProjectDomainError, ports::ProjectRepository, services::ProjectServiceError,
};
use rstest_bdd_macros::then;

#[then(r#"the created project has slug "{slug}""#)]
fn created_project_has_slug(world: &ProjectWorld, slug: String) -> Result<(), eyre::Report> {
    let result = world
        .last_create_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing create result in scenario world"))?;
    let project = result
        .as_ref()
        .map_err(|err| eyre::eyre!("expected a created project, got {err}"))?;
    if project.slug().as_str() != slug {
        return Err(eyre::eyre!(
            "expected slug '{slug}', found '{}'",
            project.slug()
        ));
    }
    Ok(())
}

#[then("creation fails because the project already exists")]
fn creation_fails_already_exists(world: &ProjectWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_create_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing create result in scenario world"))?;
    if !matches!(result, Err(ProjectServiceError::AlreadyExists(_))) {
        return Err(eyre::eyre!("expected already-exists error, got {result:?}"));
    }
    Ok(())
}

#[then("creation fails with an invalid slug error")]
fn creation_fails_invalid_slug(world: &ProjectWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_create_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing create result in scenario world"))?;
    if !matches!(
        result,
        Err(ProjectServiceError::Domain(ProjectDomainError::InvalidSlug(_)))
    ) {
        return Err(eyre::eyre!("expected invalid slug error, got {result:?}"));
    }
    Ok(())
}

#[then("the plugin received {count:usize} provisioning requests")]
fn plugin_received_requests(world: &ProjectWorld, count: usize) -> Result<(), eyre::Report> {
    run_async(world.service.drain_provisioning());
    let plugin = world
        .plugin
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no plugin registered in scenario world"))?;
    let received = plugin.requests().len();
    if received != count {
        return Err(eyre::eyre!(
            "expected {count} provisioning requests, found {received}"
        ));
    }
    Ok(())
}

#[then("the store holds {count:usize} projects")]
fn store_holds_projects(world: &ProjectWorld, count: usize) -> Result<(), eyre::Report> {
    let stored = run_async(world.repository.list(u32::MAX, 0))
        .map_err(|err| eyre::eyre!("listing the store failed: {err}"))?;
    if stored.len() != count {
        return Err(eyre::eyre!(
            "expected {count} stored projects, found {}",
            stored.len()
        ));
    }
    Ok(())
}
