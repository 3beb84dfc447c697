//! In-memory integration tests for detached project provisioning.

use std::time::Duration;

use super::helpers::{Wiring, wiring};
use quokka::{
    plugin::{adapters::ProvisionBehaviour, domain::ProvisionResult},
    project::services::{CreateProjectRequest, ProvisioningPolicy},
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn provisioning_request_identifies_the_project(wiring: Wiring) {
    let plugin = wiring
        .register_plugin(
            "proxmox",
            ProvisionBehaviour::Succeed(ProvisionResult::new("vm-101", "provisioned")),
        )
        .expect("plugin should register");

    let project = wiring
        .service
        .create(CreateProjectRequest::new("Alpha", "alpha"))
        .await
        .expect("create should succeed");
    wiring.service.drain_provisioning().await;

    let requests = plugin.requests();
    let request = requests.first().expect("one provisioning request");
    assert_eq!(requests.len(), 1);
    assert_eq!(request.project_id(), project.id().to_string());
    assert_eq!(request.project_name(), "Alpha");
    assert_eq!(request.template(), None);
    assert_eq!(plugin.completed(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn each_project_is_provisioned_once(wiring: Wiring) {
    let plugin = wiring
        .register_plugin(
            "proxmox",
            ProvisionBehaviour::Succeed(ProvisionResult::new("vm-101", "provisioned")),
        )
        .expect("plugin should register");

    for slug in ["alpha", "beta", "gamma"] {
        wiring
            .service
            .create(CreateProjectRequest::new(format!("Project {slug}"), slug))
            .await
            .expect("create should succeed");
    }
    wiring.service.drain_provisioning().await;

    let mut names: Vec<String> = plugin
        .requests()
        .iter()
        .map(|request| request.project_name().to_owned())
        .collect();
    names.sort();
    assert_eq!(names, ["Project alpha", "Project beta", "Project gamma"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn only_the_policy_plugin_is_called(wiring: Wiring) {
    let proxmox = wiring
        .register_plugin(
            "proxmox",
            ProvisionBehaviour::Succeed(ProvisionResult::new("vm-101", "provisioned")),
        )
        .expect("plugin should register");
    let docker = wiring
        .register_plugin(
            "docker",
            ProvisionBehaviour::Succeed(ProvisionResult::new("ctr-7", "running")),
        )
        .expect("plugin should register");
    let configured =
        wiring.with_policy(ProvisioningPolicy::new("docker", Duration::from_secs(5)));

    configured
        .service
        .create(CreateProjectRequest::new("Alpha", "alpha"))
        .await
        .expect("create should succeed");
    configured.service.drain_provisioning().await;

    assert_eq!(docker.requests().len(), 1);
    assert!(proxmox.requests().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn slow_plugin_does_not_delay_creation(wiring: Wiring) {
    let plugin = wiring
        .register_plugin(
            "proxmox",
            ProvisionBehaviour::Delay(
                Duration::from_secs(60),
                ProvisionResult::new("vm-101", "provisioned"),
            ),
        )
        .expect("plugin should register");
    let configured =
        wiring.with_policy(ProvisioningPolicy::new("proxmox", Duration::from_millis(50)));

    let started = tokio::time::Instant::now();
    configured
        .service
        .create(CreateProjectRequest::new("Alpha", "alpha"))
        .await
        .expect("create should succeed");
    assert!(started.elapsed() < Duration::from_secs(5));

    configured.service.drain_provisioning().await;
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(plugin.completed(), 0);
}
