//! Tokio implementation of the [`CommandRunner`] port.

use crate::plugin::{
    domain::Deadline,
    ports::{CommandOutput, CommandRunner, PluginError, PluginResult},
};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::process::Stdio;

/// Runs programs with `tokio::process`, killing the child when the deadline
/// passes or the calling future is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioCommandRunner;

impl TokioCommandRunner {
    /// Creates a runner.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        deadline: Deadline,
    ) -> PluginResult<CommandOutput> {
        let child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| match err.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                    PluginError::Unavailable(format!("cannot execute {program}: {err}"))
                }
                _ => PluginError::backend(err),
            })?;

        // Dropping the `wait_with_output` future on expiry drops the child,
        // and `kill_on_drop` terminates it.
        let output = deadline
            .run(child.wait_with_output())
            .await
            .map_err(PluginError::on_elapsed("command"))?
            .map_err(PluginError::backend)?;

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
