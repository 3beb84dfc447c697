//! Line-delimited JSON output contract for provider command-line tools.
//!
//! Every non-blank line written to standard output must be one JSON object
//! tagged by `type`:
//!
//! ```text
//! {"type":"log","level":"info","message":"cloning template"}
//! {"type":"result","resource_id":"vm-101","status":"provisioned","metadata":{"node":"pve-01"}}
//! {"type":"error","message":"quota exceeded"}
//! ```
//!
//! Lines that are not valid records are protocol violations; nothing is
//! guessed from free-form text.

use crate::plugin::ports::{PluginError, PluginResult};
use serde::Deserialize;
use std::collections::BTreeMap;

/// One record emitted by the tool.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(super) enum CliRecord {
    /// Progress output, forwarded to the log.
    Log {
        #[serde(default)]
        level: Option<String>,
        message: String,
    },
    /// Terminal outcome of the command.
    Result(CliResultRecord),
    /// Failure reported by the tool itself.
    Error { message: String },
}

/// Payload of a `result` record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(super) struct CliResultRecord {
    #[serde(default)]
    pub(super) resource_id: Option<String>,
    pub(super) status: String,
    #[serde(default)]
    pub(super) metadata: BTreeMap<String, String>,
}

/// Parses every non-blank line of `stdout` into a record.
pub(super) fn parse_records(stdout: &str) -> PluginResult<Vec<CliRecord>> {
    stdout
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str::<CliRecord>(line).map_err(|err| {
                PluginError::Protocol(format!("line {}: {err}", index.saturating_add(1)))
            })
        })
        .collect()
}

/// Splits records into log lines, the single result and the first reported
/// error.
pub(super) struct Transcript {
    pub(super) logs: Vec<(Option<String>, String)>,
    pub(super) results: Vec<CliResultRecord>,
    pub(super) error: Option<String>,
}

impl Transcript {
    pub(super) fn from_records(records: Vec<CliRecord>) -> Self {
        let mut transcript = Self {
            logs: Vec::new(),
            results: Vec::new(),
            error: None,
        };
        for record in records {
            match record {
                CliRecord::Log { level, message } => transcript.logs.push((level, message)),
                CliRecord::Result(result) => transcript.results.push(result),
                CliRecord::Error { message } => {
                    transcript.error.get_or_insert(message);
                }
            }
        }
        transcript
    }

    /// Returns the only `result` record.
    pub(super) fn into_single_result(self) -> PluginResult<CliResultRecord> {
        let mut results = self.results.into_iter();
        match (results.next(), results.next()) {
            (Some(result), None) => Ok(result),
            (None, _) => Err(PluginError::Protocol(
                "tool output contained no result record".to_owned(),
            )),
            (Some(_), Some(_)) => Err(PluginError::Protocol(
                "tool output contained more than one result record".to_owned(),
            )),
        }
    }
}
