//! Subprocess execution port for adapters that wrap a command-line tool.

use crate::plugin::domain::Deadline;
use crate::plugin::ports::PluginResult;
use async_trait::async_trait;

/// Captured result of a finished subprocess.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit code, absent when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Captured standard output.
    pub stdout: Vec<u8>,
    /// Captured standard error.
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Returns `true` when the process exited with status zero.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.exit_code, Some(0))
    }

    /// Returns standard output decoded lossily as UTF-8.
    #[must_use]
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Returns standard error decoded lossily as UTF-8 and trimmed.
    #[must_use]
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_owned()
    }
}

/// Runs external programs on behalf of plugin adapters.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `program` with `args`, capturing its output.
    ///
    /// A non-zero exit status is not an error at this layer; callers inspect
    /// [`CommandOutput::exit_code`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::plugin::ports::PluginError::Unavailable`] when the
    /// program cannot be spawned and
    /// [`crate::plugin::ports::PluginError::DeadlineExceeded`] when it is
    /// still running at `deadline`, in which case the child is killed.
    async fn run(
        &self,
        program: &str,
        args: &[String],
        deadline: Deadline,
    ) -> PluginResult<CommandOutput>;
}
