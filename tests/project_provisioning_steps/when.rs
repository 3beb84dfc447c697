//! When steps for project provisioning BDD scenarios.

use super::world::{ProjectWorld, run_async};
use quokka::project::services::CreateProjectRequest;
use rstest_bdd_macros::when;

#[when(r#"a project named "{name}" with slug "{slug}" is created"#)]
fn create_project(world: &mut ProjectWorld, name: String, slug: String) {
    let request = CreateProjectRequest::new(name, slug);
    world.last_create_result = Some(run_async(world.service.create(request)));
}
