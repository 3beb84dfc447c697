//! Unit tests for plugin domain types.

use crate::plugin::domain::{
    Deadline, DeadlineElapsed, PluginDomainError, PluginName, ProvisionRequest, ProvisionResult,
};
use rstest::rstest;
use std::time::Duration;

// ── PluginName validation ──────────────────────────────────────────

#[rstest]
#[case("proxmox")]
#[case("forge-ovh")]
#[case("k8s_v2")]
#[case("a")]
fn valid_plugin_names_are_accepted(#[case] input: &str) {
    let name = PluginName::new(input).expect("valid plugin name");
    assert_eq!(name.as_str(), input);
}

#[rstest]
fn empty_plugin_name_is_rejected() {
    assert_eq!(PluginName::new(""), Err(PluginDomainError::EmptyPluginName));
}

#[rstest]
#[case("Proxmox")]
#[case(" proxmox")]
#[case("prox.mox")]
#[case("prox mox")]
fn plugin_names_are_not_normalised(#[case] input: &str) {
    assert!(matches!(
        PluginName::new(input),
        Err(PluginDomainError::InvalidPluginName(_))
    ));
}

#[rstest]
fn plugin_name_over_limit_is_rejected() {
    let long = "p".repeat(65);
    assert!(matches!(
        PluginName::new(long),
        Err(PluginDomainError::PluginNameTooLong(_))
    ));
}

#[rstest]
fn plugin_name_deserialisation_validates() {
    let rejected: Result<PluginName, _> = serde_json::from_str("\"NOT VALID\"");
    assert!(rejected.is_err());

    let accepted: PluginName = serde_json::from_str("\"proxmox\"").expect("valid json name");
    assert_eq!(accepted.to_string(), "proxmox");
}

// ── Deadline ───────────────────────────────────────────────────────

#[rstest]
#[tokio::test(start_paused = true)]
async fn deadline_cancels_slow_futures() {
    let deadline = Deadline::after(Duration::from_secs(5));

    let outcome = deadline
        .run(tokio::time::sleep(Duration::from_secs(60)))
        .await;

    assert_eq!(outcome, Err(DeadlineElapsed));
    assert!(deadline.has_elapsed());
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn deadline_passes_through_fast_futures() {
    let deadline = Deadline::after(Duration::from_secs(5));

    let outcome = deadline.run(async { 7 }).await;

    assert_eq!(outcome, Ok(7));
    assert!(!deadline.has_elapsed());
}

#[rstest]
#[case(Duration::MAX)]
#[case(Duration::from_secs(86_400 * 365 * 1000))]
#[tokio::test(start_paused = true)]
async fn oversized_timeouts_saturate_instead_of_panicking(#[case] timeout: Duration) {
    let deadline = Deadline::after(timeout);

    tokio::time::sleep(Duration::from_secs(3600)).await;

    assert!(!deadline.has_elapsed());
    assert_eq!(deadline.run(async { 7 }).await, Ok(7));
}

// ── Payloads ───────────────────────────────────────────────────────

#[rstest]
fn provision_request_serialises_with_wire_field_names() {
    let request = ProvisionRequest::new("0b5f8c4e", "Alpha")
        .with_template("debian-12")
        .with_resource("cores", 2);

    let json = serde_json::to_value(&request).expect("serialise request");

    assert_eq!(
        json,
        serde_json::json!({
            "project_id": "0b5f8c4e",
            "project_name": "Alpha",
            "template": "debian-12",
            "resources": { "cores": 2 }
        })
    );
}

#[rstest]
fn provision_request_omits_empty_optional_fields() {
    let json = serde_json::to_value(ProvisionRequest::new("0b5f8c4e", "Alpha"))
        .expect("serialise request");

    assert_eq!(
        json,
        serde_json::json!({ "project_id": "0b5f8c4e", "project_name": "Alpha" })
    );
}

#[rstest]
fn provision_result_keeps_metadata() {
    let result = ProvisionResult::new("vm-101", "provisioned").with_metadata("node", "pve-01");

    assert_eq!(result.resource_id(), "vm-101");
    assert_eq!(
        result.metadata().get("node").map(String::as_str),
        Some("pve-01")
    );
}
