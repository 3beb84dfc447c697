//! Integration tests for the subprocess command runner.

#![cfg(unix)]

use std::time::Duration;

use quokka::plugin::{
    adapters::TokioCommandRunner,
    domain::Deadline,
    ports::{CommandRunner, PluginError},
};
use rstest::rstest;

fn shell(script: &str) -> Vec<String> {
    vec!["-c".to_owned(), script.to_owned()]
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn captures_output_and_exit_code() {
    let runner = TokioCommandRunner::new();

    let output = runner
        .run(
            "sh",
            &shell("echo out; echo err >&2; exit 4"),
            Deadline::after(Duration::from_secs(10)),
        )
        .await
        .expect("sh should run");

    assert_eq!(output.exit_code, Some(4));
    assert!(!output.success());
    assert_eq!(output.stdout_lossy().trim(), "out");
    assert_eq!(output.stderr_lossy(), "err");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deadline_stops_a_hung_command() {
    let runner = TokioCommandRunner::new();
    let started = std::time::Instant::now();

    let result = runner
        .run(
            "sh",
            &shell("sleep 30"),
            Deadline::after(Duration::from_millis(100)),
        )
        .await;

    assert!(matches!(
        result,
        Err(PluginError::DeadlineExceeded {
            operation: "command"
        })
    ));
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_program_is_unavailable() {
    let runner = TokioCommandRunner::new();

    let result = runner
        .run(
            "quokka-test-no-such-program",
            &[],
            Deadline::after(Duration::from_secs(10)),
        )
        .await;

    assert!(matches!(result, Err(PluginError::Unavailable(_))));
}
