//! In-memory integration tests for the project lifecycle.

use super::helpers::{Wiring, wiring};
use quokka::project::{
    ports::ProjectRepository,
    services::{CreateProjectRequest, ProjectServiceError, UpdateProjectRequest},
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn created_project_round_trips_through_the_store(wiring: Wiring) {
    let created = wiring
        .service
        .create(CreateProjectRequest::new("Alpha", "alpha").with_description("first project"))
        .await
        .expect("create should succeed");

    let stored = wiring
        .repository
        .find_by_id(created.id())
        .await
        .expect("lookup should succeed")
        .expect("project should be stored");
    assert_eq!(stored, created);

    let fetched = wiring
        .service
        .get(&created.id().to_string())
        .await
        .expect("get should succeed");
    assert_eq!(fetched.description().map(|d| d.as_str()), Some("first project"));
    assert!(fetched.is_active());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn full_lifecycle_ends_with_not_found(wiring: Wiring) {
    let created = wiring
        .service
        .create(CreateProjectRequest::new("Alpha", "alpha"))
        .await
        .expect("create should succeed");
    let id = created.id().to_string();

    let updated = wiring
        .service
        .update(
            &id,
            UpdateProjectRequest::new()
                .with_name("Alpha Renamed")
                .with_active(false),
        )
        .await
        .expect("update should succeed");
    assert_eq!(updated.name().as_str(), "Alpha Renamed");
    assert_eq!(updated.slug().as_str(), "alpha");
    assert!(!updated.is_active());
    assert!(updated.updated_at() >= created.updated_at());

    wiring.service.delete(&id).await.expect("delete should succeed");

    let result = wiring.service.get(&id).await;
    assert!(matches!(result, Err(ProjectServiceError::NotFound(missing)) if missing == created.id()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn slug_can_be_reused_after_delete(wiring: Wiring) {
    let first = wiring
        .service
        .create(CreateProjectRequest::new("Alpha", "alpha"))
        .await
        .expect("create should succeed");

    let duplicate = wiring
        .service
        .create(CreateProjectRequest::new("Alpha Two", "alpha"))
        .await;
    assert!(matches!(duplicate, Err(ProjectServiceError::AlreadyExists(_))));

    wiring
        .service
        .delete(&first.id().to_string())
        .await
        .expect("delete should succeed");

    let second = wiring
        .service
        .create(CreateProjectRequest::new("Alpha Two", "alpha"))
        .await
        .expect("slug should be free again");
    assert_ne!(second.id(), first.id());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pages_cover_every_project_once(wiring: Wiring) {
    for slug in ["one", "two", "three", "four", "five"] {
        wiring
            .service
            .create(CreateProjectRequest::new(format!("Project {slug}"), slug))
            .await
            .expect("create should succeed");
    }

    let first_page = wiring.service.list(2, 0).await.expect("first page");
    let second_page = wiring.service.list(2, 2).await.expect("second page");
    let last_page = wiring.service.list(2, 4).await.expect("last page");
    let everything = wiring.service.list(0, -3).await.expect("default page");

    assert_eq!(first_page.len(), 2);
    assert_eq!(second_page.len(), 2);
    assert_eq!(last_page.len(), 1);
    let paged: Vec<_> = first_page
        .iter()
        .chain(&second_page)
        .chain(&last_page)
        .map(|project| project.id())
        .collect();
    let all: Vec<_> = everything.iter().map(|project| project.id()).collect();
    assert_eq!(paged, all);
}
