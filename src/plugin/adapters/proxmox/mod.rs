//! Proxmox provisioning through the `forge-ovh-cli` command-line tool.
//!
//! Request fields are translated into subcommand arguments and the tool is
//! asked for line-delimited JSON output (see [`protocol`]). Resource
//! identifiers come only from a structured `result` record.

mod protocol;

use self::protocol::{CliResultRecord, Transcript, parse_records};
use crate::plugin::{
    adapters::TokioCommandRunner,
    domain::{Deadline, PluginName, ProvisionRequest, ProvisionResult, StatusResult},
    ports::{CommandOutput, CommandRunner, PluginError, PluginResult, ProvisioningPlugin},
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Registry name of the Proxmox plugin.
pub const PROXMOX_PLUGIN_NAME: &str = "proxmox";

/// Executable used when no explicit path is configured.
pub const DEFAULT_CLI_PATH: &str = "forge-ovh-cli";

const OUTPUT_FORMAT_ARGS: [&str; 2] = ["--output", "jsonl"];

/// Plugin wrapping `forge-ovh-cli` for Proxmox VMs and containers.
pub struct ProxmoxCliPlugin<R = TokioCommandRunner>
where
    R: CommandRunner,
{
    name: PluginName,
    cli_path: String,
    runner: Arc<R>,
}

impl ProxmoxCliPlugin<TokioCommandRunner> {
    /// Creates a plugin that executes `cli_path` as a real subprocess.
    ///
    /// An empty path falls back to [`DEFAULT_CLI_PATH`].
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Protocol`] only if the built-in plugin name is
    /// rejected, which indicates a programming error.
    pub fn new(cli_path: impl Into<String>) -> PluginResult<Self> {
        Self::with_runner(cli_path, Arc::new(TokioCommandRunner::new()))
    }
}

impl<R> ProxmoxCliPlugin<R>
where
    R: CommandRunner,
{
    /// Creates a plugin with an explicit command runner.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Protocol`] only if the built-in plugin name is
    /// rejected, which indicates a programming error.
    pub fn with_runner(raw_cli_path: impl Into<String>, runner: Arc<R>) -> PluginResult<Self> {
        let name = PluginName::new(PROXMOX_PLUGIN_NAME)
            .map_err(|err| PluginError::Protocol(err.to_string()))?;
        let configured = raw_cli_path.into();
        let cli_path = if configured.trim().is_empty() {
            DEFAULT_CLI_PATH.to_owned()
        } else {
            configured
        };
        Ok(Self {
            name,
            cli_path,
            runner,
        })
    }

    /// Returns the executable path.
    #[must_use]
    pub fn cli_path(&self) -> &str {
        &self.cli_path
    }

    async fn invoke(
        &self,
        operation: &'static str,
        args: Vec<String>,
        deadline: Deadline,
    ) -> PluginResult<Transcript> {
        let output = self
            .runner
            .run(&self.cli_path, &args, deadline)
            .await
            .map_err(|err| match err {
                PluginError::DeadlineExceeded { .. } => PluginError::deadline_exceeded(operation),
                other => other,
            })?;

        let stdout = output.stdout_lossy();
        if !output.success() {
            // A failing tool may print usage text instead of records, so an
            // `error` record is only used when the output parses.
            let reported = parse_records(&stdout)
                .ok()
                .and_then(|records| Transcript::from_records(records).error);
            return Err(self.command_failed(&output, reported.as_deref()));
        }

        let transcript = Transcript::from_records(parse_records(&stdout)?);
        for (level, message) in &transcript.logs {
            tracing::debug!(
                plugin = %self.name,
                operation,
                tool_level = level.as_deref().unwrap_or("info"),
                "{message}"
            );
        }
        if let Some(message) = transcript.error.as_deref() {
            return Err(self.command_failed(&output, Some(message)));
        }
        Ok(transcript)
    }

    fn command_failed(&self, output: &CommandOutput, reported: Option<&str>) -> PluginError {
        let stderr = reported.map_or_else(|| output.stderr_lossy(), ToOwned::to_owned);
        PluginError::CommandFailed {
            program: self.cli_path.clone(),
            exit_code: output.exit_code,
            stderr,
        }
    }
}

fn with_output_format(mut args: Vec<String>) -> Vec<String> {
    args.extend(OUTPUT_FORMAT_ARGS.iter().map(|arg| (*arg).to_owned()));
    args
}

/// Builds `create` arguments from a provisioning request.
///
/// Resource hints become repeated `--resource key=value` pairs; string values
/// are passed verbatim and other JSON values in their compact JSON form.
fn provision_args(request: &ProvisionRequest) -> Vec<String> {
    let mut args = vec![
        "create".to_owned(),
        "--name".to_owned(),
        request.project_name().to_owned(),
        "--project-id".to_owned(),
        request.project_id().to_owned(),
    ];
    if let Some(template) = request.template() {
        args.push("--template".to_owned());
        args.push(template.to_owned());
    }
    for (key, value) in request.resources() {
        let rendered = match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        args.push("--resource".to_owned());
        args.push(format!("{key}={rendered}"));
    }
    with_output_format(args)
}

fn resource_args(subcommand: &str, resource_id: &str) -> Vec<String> {
    with_output_format(vec![
        subcommand.to_owned(),
        "--id".to_owned(),
        resource_id.to_owned(),
    ])
}

fn into_provision_result(record: CliResultRecord) -> PluginResult<ProvisionResult> {
    let CliResultRecord {
        resource_id,
        status,
        metadata,
    } = record;
    let resource_id = resource_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| PluginError::Protocol("result record has no resource_id".to_owned()))?;
    Ok(metadata
        .into_iter()
        .fold(ProvisionResult::new(resource_id, status), |result, (key, value)| {
            result.with_metadata(key, value)
        }))
}

fn into_status_result(record: CliResultRecord) -> StatusResult {
    record
        .metadata
        .into_iter()
        .fold(StatusResult::new(record.status), |result, (key, value)| {
            result.with_metadata(key, value)
        })
}

#[async_trait]
impl<R> ProvisioningPlugin for ProxmoxCliPlugin<R>
where
    R: CommandRunner + 'static,
{
    fn name(&self) -> &PluginName {
        &self.name
    }

    async fn health(&self, deadline: Deadline) -> PluginResult<()> {
        let output = self
            .runner
            .run(&self.cli_path, &["--version".to_owned()], deadline)
            .await
            .map_err(|err| match err {
                PluginError::DeadlineExceeded { .. } => PluginError::deadline_exceeded("health"),
                other => other,
            })?;
        if output.success() {
            Ok(())
        } else {
            Err(self.command_failed(&output, None))
        }
    }

    async fn provision(
        &self,
        deadline: Deadline,
        request: &ProvisionRequest,
    ) -> PluginResult<ProvisionResult> {
        let transcript = self
            .invoke("provision", provision_args(request), deadline)
            .await?;
        into_provision_result(transcript.into_single_result()?)
    }

    async fn status(&self, deadline: Deadline, resource_id: &str) -> PluginResult<StatusResult> {
        let transcript = self
            .invoke("status", resource_args("status", resource_id), deadline)
            .await?;
        Ok(into_status_result(transcript.into_single_result()?))
    }

    async fn deprovision(&self, deadline: Deadline, resource_id: &str) -> PluginResult<()> {
        self.invoke("deprovision", resource_args("delete", resource_id), deadline)
            .await
            .map(|_| ())
    }
}

impl<R> std::fmt::Debug for ProxmoxCliPlugin<R>
where
    R: CommandRunner,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxmoxCliPlugin")
            .field("name", &self.name)
            .field("cli_path", &self.cli_path)
            .finish_non_exhaustive()
    }
}
